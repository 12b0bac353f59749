//! Request pipeline stages
//!
//! The safety and rotation stages every recommendation request passes
//! through, in order: rate limiting, validation, sanitization, and (after
//! generation) rotation. All of it is synchronous, allocation-light code
//! with no I/O; the async edges live in `services`.

pub mod rate_limit;
pub mod rotation;
pub mod sanitize;
pub mod validate;
