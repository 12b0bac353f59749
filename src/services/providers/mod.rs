//! Movie metadata provider abstraction
//!
//! This module provides a pluggable architecture for metadata sources with
//! very different shapes: a structured-JSON movie database (TMDB) and a
//! free-text fact sheet parsed line by line. The resolver talks to both
//! through this trait and never learns which kind answered.

use crate::{
    error::AppResult,
    models::{MovieRecord, StreamingAvailability},
};

pub mod freetext;
pub mod tmdb;

#[cfg(test)]
use mockall::automock;

/// Trait for movie metadata providers
///
/// `search` is the one capability every provider must have. Identity lookup
/// and availability are optional: providers without an external-ID index or
/// a native ID system keep the defaults and report nothing.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Provider name for logging and record attribution
    fn name(&self) -> &'static str;

    /// Identity lookup by cross-provider external ID (IMDB ID)
    async fn lookup_by_external_id(&self, _external_id: &str) -> AppResult<Option<MovieRecord>> {
        Ok(None)
    }

    /// Search by title, optionally narrowed by release year
    async fn search(&self, title: &str, year: Option<i32>) -> AppResult<Option<MovieRecord>>;

    /// Streaming availability keyed on this provider's own numeric ID
    async fn fetch_availability(
        &self,
        _provider_id: u64,
    ) -> AppResult<Option<StreamingAvailability>> {
        Ok(None)
    }
}
