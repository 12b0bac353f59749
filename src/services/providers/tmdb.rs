//! TMDB API provider
//!
//! Structured-JSON metadata source.
//!
//! API flow:
//! 1. Identity lookup: /find/{imdb_id}?external_source=imdb_id → TMDB ID
//! 2. Search: /search/movie?query=...&year=... → first hit's TMDB ID
//! 3. Details: /movie/{id}?append_to_response=credits → full record
//! 4. Availability: /movie/{id}/watch/providers → offers for one region

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{
        MovieRecord, StreamingAvailability, TmdbMovieDetails, TmdbSearchHit, TmdbWatchRegion,
    },
    services::providers::MetadataProvider,
};

/// Per-request timeout for every TMDB call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    watch_region: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String, watch_region: String) -> Self {
        Self {
            http_client: HttpClient::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            api_key,
            api_url,
            watch_region,
        }
    }

    /// Finds the TMDB ID of the best search hit, if any.
    async fn search_movie_id(&self, title: &str, year: Option<i32>) -> AppResult<Option<u64>> {
        let url = format!("{}/search/movie", self.api_url);

        let mut query: Vec<(&str, String)> = vec![
            ("api_key", self.api_key.clone()),
            ("query", title.to_string()),
        ];
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }

        let response = self.http_client.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB search returned status {}: {}",
                status, body
            )));
        }

        #[derive(Deserialize)]
        struct SearchResponse {
            #[serde(default)]
            results: Vec<TmdbSearchHit>,
        }

        let search: SearchResponse = response.json().await?;
        Ok(search.results.first().map(|hit| hit.id))
    }

    /// Fetches full details (with credits) for a TMDB ID.
    async fn fetch_details(&self, movie_id: u64) -> AppResult<Option<MovieRecord>> {
        let url = format!("{}/movie/{}", self.api_url, movie_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("append_to_response", "credits"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB details returned status {}: {}",
                status, body
            )));
        }

        let details: TmdbMovieDetails = response.json().await?;
        Ok(Some(MovieRecord::from(details)))
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn lookup_by_external_id(&self, external_id: &str) -> AppResult<Option<MovieRecord>> {
        let url = format!("{}/find/{}", self.api_url, external_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("external_source", "imdb_id"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB find returned status {}: {}",
                status, body
            )));
        }

        #[derive(Deserialize)]
        struct FindResponse {
            #[serde(default)]
            movie_results: Vec<TmdbSearchHit>,
        }

        let find: FindResponse = response.json().await?;
        match find.movie_results.first() {
            Some(hit) => self.fetch_details(hit.id).await,
            None => Ok(None),
        }
    }

    async fn search(&self, title: &str, year: Option<i32>) -> AppResult<Option<MovieRecord>> {
        let movie_id = match self.search_movie_id(title, year).await? {
            Some(id) => id,
            None => return Ok(None),
        };

        tracing::debug!(title = %title, movie_id = movie_id, "TMDB search hit");
        self.fetch_details(movie_id).await
    }

    async fn fetch_availability(
        &self,
        provider_id: u64,
    ) -> AppResult<Option<StreamingAvailability>> {
        let url = format!("{}/movie/{}/watch/providers", self.api_url, provider_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB watch providers returned status {}: {}",
                status, body
            )));
        }

        #[derive(Deserialize)]
        struct WatchProvidersResponse {
            #[serde(default)]
            results: HashMap<String, TmdbWatchRegion>,
        }

        let mut watch: WatchProvidersResponse = response.json().await?;
        Ok(watch
            .results
            .remove(&self.watch_region)
            .map(StreamingAvailability::from))
    }
}
