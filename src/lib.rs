//! Joint movie-night recommendations for two people.
//!
//! Takes each partner's favorite movies, asks a chat model for titles both
//! would enjoy, and enriches the results with metadata and streaming
//! availability from pluggable providers. Sessions rotate through a fixed
//! window of candidates as the pair dismisses them.

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod redact;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
