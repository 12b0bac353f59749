//! Metadata resolution
//!
//! Turns bare candidate titles into normalized records by querying providers
//! in priority order. Provider failures never escape this module: a network
//! error, bad status, or unparsable body is logged (scrubbed) and treated as
//! "no match", so one flaky upstream degrades cards instead of requests.

use std::sync::Arc;

use crate::{
    cache::{Cache, CacheKey},
    cached,
    error::{AppError, AppResult},
    models::{MovieRecord, StreamingAvailability},
    pipeline::sanitize::escape_html,
    redact,
    services::providers::MetadataProvider,
};

const RESOLVE_CACHE_TTL: u64 = 3600; // 1 hour
const AVAIL_CACHE_TTL: u64 = 604800; // 1 week

pub struct MetadataResolver {
    providers: Vec<Arc<dyn MetadataProvider>>,
    cache: Cache,
}

impl MetadataResolver {
    pub fn new(providers: Vec<Arc<dyn MetadataProvider>>) -> Self {
        Self {
            providers,
            cache: Cache::new(),
        }
    }

    /// Resolves a title to a display-ready record, or `None` when no
    /// provider can supply one. Never errors.
    pub async fn resolve(
        &self,
        title: &str,
        year_hint: Option<i32>,
        external_id: Option<&str>,
    ) -> Option<MovieRecord> {
        match self.resolve_cached(title, year_hint, external_id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(
                    title = %title,
                    error = %redact::scrub(&e.to_string()),
                    "Metadata resolution failed"
                );
                None
            }
        }
    }

    /// Streaming availability for a resolved record, keyed strictly on the
    /// resolving provider's own numeric ID. `None` when the record has no
    /// native ID or the lookup fails.
    pub async fn availability(&self, record: &MovieRecord) -> Option<StreamingAvailability> {
        let provider_id = record.provider_id?;
        let provider = self
            .providers
            .iter()
            .find(|provider| provider.name() == record.provider)?;

        match self.availability_cached(provider.as_ref(), provider_id).await {
            Ok(availability) => availability,
            Err(e) => {
                tracing::debug!(
                    provider_id = provider_id,
                    error = %redact::scrub(&e.to_string()),
                    "Availability lookup failed"
                );
                None
            }
        }
    }

    /// Resolves a title and, when the record supports it, its availability.
    pub async fn enrich(
        &self,
        title: &str,
    ) -> Option<(MovieRecord, Option<StreamingAvailability>)> {
        let record = self.resolve(title, None, None).await?;
        let availability = self.availability(&record).await;
        Some((record, availability))
    }

    async fn resolve_cached(
        &self,
        title: &str,
        year_hint: Option<i32>,
        external_id: Option<&str>,
    ) -> AppResult<Option<MovieRecord>> {
        cached!(
            self.cache,
            CacheKey::Resolve(title.to_string(), year_hint),
            RESOLVE_CACHE_TTL,
            self.resolve_via_providers(title, year_hint, external_id)
        )
    }

    /// Walks the provider chain; the first non-empty match wins.
    ///
    /// A clean miss everywhere is a cacheable `None`. If any provider errored
    /// and none matched, the error propagates instead so a transient outage
    /// is retried on the next request rather than cached for an hour.
    async fn resolve_via_providers(
        &self,
        title: &str,
        year_hint: Option<i32>,
        external_id: Option<&str>,
    ) -> AppResult<Option<MovieRecord>> {
        let mut last_error: Option<AppError> = None;

        for provider in &self.providers {
            match resolve_with(provider.as_ref(), title, year_hint, external_id).await {
                Ok(Some(record)) => {
                    tracing::info!(
                        title = %title,
                        provider = provider.name(),
                        "Title resolved"
                    );
                    return Ok(Some(escape_record(record)));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(
                        title = %title,
                        provider = provider.name(),
                        error = %redact::scrub(&e.to_string()),
                        "Provider lookup failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    async fn availability_cached(
        &self,
        provider: &dyn MetadataProvider,
        provider_id: u64,
    ) -> AppResult<Option<StreamingAvailability>> {
        cached!(
            self.cache,
            CacheKey::Availability(provider_id),
            AVAIL_CACHE_TTL,
            async move {
                let availability = provider.fetch_availability(provider_id).await?;
                Ok::<_, AppError>(availability.map(escape_availability))
            }
        )
    }
}

/// One provider's lookup cascade: external ID, then title plus year, then
/// bare title. Each step only runs when the previous found nothing.
async fn resolve_with(
    provider: &dyn MetadataProvider,
    title: &str,
    year_hint: Option<i32>,
    external_id: Option<&str>,
) -> AppResult<Option<MovieRecord>> {
    if let Some(id) = external_id {
        if let Some(record) = provider.lookup_by_external_id(id).await? {
            return Ok(Some(record));
        }
    }

    if year_hint.is_some() {
        if let Some(record) = provider.search(title, year_hint).await? {
            return Ok(Some(record));
        }
    }

    provider.search(title, None).await
}

/// Escapes every externally sourced display field before the record leaves
/// the resolver.
fn escape_record(record: MovieRecord) -> MovieRecord {
    MovieRecord {
        title: escape_html(&record.title),
        year: escape_html(&record.year),
        plot: escape_html(&record.plot),
        cast: escape_html(&record.cast),
        runtime: escape_html(&record.runtime),
        genre: escape_html(&record.genre),
        director: escape_html(&record.director),
        rating: escape_html(&record.rating),
        external_id: record.external_id,
        provider_id: record.provider_id,
        provider: record.provider,
    }
}

fn escape_availability(availability: StreamingAvailability) -> StreamingAvailability {
    StreamingAvailability {
        subscription: escape_all(availability.subscription),
        rent: escape_all(availability.rent),
        buy: escape_all(availability.buy),
        deep_link: availability.deep_link.map(|link| escape_html(&link)),
    }
}

fn escape_all(names: Vec<String>) -> Vec<String> {
    names.iter().map(|name| escape_html(name)).collect()
}
