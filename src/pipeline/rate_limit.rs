//! Per-session rate limiting
//!
//! Sliding-window limiter with a penalty block: more than `max_requests`
//! requests inside `window_secs` puts the session in a block that outlasts
//! the window itself. Time is passed in by the caller, which keeps the state
//! machine deterministic under test.

use chrono::{DateTime, Duration, Utc};

/// Tunables for the request gate. One instance is shared by every session;
/// the mutable history lives in [`RateWindow`], per session.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: i64,
    pub block_secs: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window_secs: 60,
            block_secs: 300,
        }
    }
}

/// Request history for one session.
#[derive(Debug, Clone, Default)]
pub struct RateWindow {
    timestamps: Vec<DateTime<Utc>>,
    blocked_until: Option<DateTime<Utc>>,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Blocked {
        message: String,
        retry_after_secs: i64,
    },
}

impl RateWindow {
    /// Runs one check-and-record step.
    ///
    /// An active block rejects immediately with the remaining wait. An
    /// expired block resets the history in full, so the session starts from
    /// a clean window rather than inheriting stale timestamps. Otherwise
    /// timestamps older than the window are aged out, the count is compared
    /// against the cap, and an allowed request is recorded at `now`.
    pub fn check(&mut self, config: &RateLimitConfig, now: DateTime<Utc>) -> RateDecision {
        if let Some(until) = self.blocked_until {
            if now < until {
                let secs = remaining_secs(until, now);
                return RateDecision::Blocked {
                    message: wait_message(secs),
                    retry_after_secs: secs,
                };
            }
            self.blocked_until = None;
            self.timestamps.clear();
        }

        let horizon = now - Duration::seconds(config.window_secs);
        self.timestamps.retain(|t| *t > horizon);

        if self.timestamps.len() as u32 >= config.max_requests {
            self.blocked_until = Some(now + Duration::seconds(config.block_secs));
            return RateDecision::Blocked {
                message: wait_message(config.block_secs),
                retry_after_secs: config.block_secs,
            };
        }

        self.timestamps.push(now);
        RateDecision::Allowed
    }

    /// Whether the session currently sits in a penalty block.
    pub fn is_blocked(&self, now: DateTime<Utc>) -> bool {
        matches!(self.blocked_until, Some(until) if now < until)
    }
}

/// Seconds until `until`, rounded up so the message never reads "0 seconds"
/// while the block still holds.
fn remaining_secs(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (until - now).num_milliseconds();
    ((millis + 999) / 1000).max(1)
}

fn wait_message(secs: i64) -> String {
    format!("Too many requests. Please try again in {secs} seconds.")
}
