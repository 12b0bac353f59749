use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Builds the display sentinel for an unresolved field, e.g. "Plot not available".
pub fn sentinel(field: &str) -> String {
    format!("{field} not available")
}

/// Actors kept when a cast list is longer than fits on a card.
pub const CAST_LIMIT: usize = 5;

/// Storefronts kept per transactional availability kind (rent, buy).
pub const RENT_BUY_LIMIT: usize = 3;

/// Normalized movie metadata as returned to the client.
///
/// Every display field is always populated: values a provider could not
/// supply carry an explicit "not available" sentinel instead of being
/// omitted, so consumers never branch on missing keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    pub year: String,
    pub plot: String,
    pub cast: String,
    pub runtime: String,
    pub genre: String,
    pub director: String,
    pub rating: String,
    /// Cross-provider identity (IMDB ID) when known.
    #[serde(default)]
    pub external_id: Option<String>,
    /// The resolving provider's own numeric ID, key for availability lookups.
    #[serde(default)]
    pub provider_id: Option<u64>,
    /// Name of the provider that resolved this record.
    pub provider: String,
}

impl MovieRecord {
    /// A record with every display field at its sentinel, used as the
    /// fallback card when resolution fails outright.
    pub fn placeholder(title: &str) -> Self {
        Self {
            title: title.to_string(),
            year: sentinel("Year"),
            plot: sentinel("Plot"),
            cast: sentinel("Cast"),
            runtime: sentinel("Runtime"),
            genre: sentinel("Genre"),
            director: sentinel("Director"),
            rating: sentinel("Rating"),
            external_id: None,
            provider_id: None,
            provider: "none".to_string(),
        }
    }
}

/// Where a movie can be watched in the configured region.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StreamingAvailability {
    /// Subscription services carrying the title. Not capped.
    pub subscription: Vec<String>,
    /// Rental storefronts, capped at [`RENT_BUY_LIMIT`].
    pub rent: Vec<String>,
    /// Purchase storefronts, capped at [`RENT_BUY_LIMIT`].
    pub buy: Vec<String>,
    /// Region-scoped link to the provider's watch page. Only http(s) links
    /// survive ingestion.
    pub deep_link: Option<String>,
}

impl StreamingAvailability {
    pub fn is_empty(&self) -> bool {
        self.subscription.is_empty() && self.rent.is_empty() && self.buy.is_empty()
    }

    /// Service names in fixed display order: subscription, then rent, then buy.
    pub fn display_order(&self) -> Vec<&str> {
        self.subscription
            .iter()
            .chain(self.rent.iter())
            .chain(self.buy.iter())
            .map(String::as_str)
            .collect()
    }
}

/// One partner's taste profile as written by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TasteAnalysis {
    /// Display label, e.g. "Movie Lover 1".
    pub partner: String,
    /// The titles as the user typed them. Display only; prompt text is
    /// sanitized separately.
    pub movies: Vec<String>,
    pub analysis: String,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// One hit from TMDB movie search or find.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchHit {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// TMDB movie details with credits appended via `append_to_response`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub credits: Option<TmdbCredits>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

/// Extracts the year from a TMDB release date such as "2010-07-16".
pub fn release_year(date: &str) -> Option<i32> {
    date.get(..4)?.parse().ok()
}

impl From<TmdbMovieDetails> for MovieRecord {
    fn from(details: TmdbMovieDetails) -> Self {
        let year = details
            .release_date
            .as_deref()
            .and_then(release_year)
            .map(|y| y.to_string())
            .unwrap_or_else(|| sentinel("Year"));

        // TMDB reports 0.0 for titles nobody has voted on.
        let rating = match details.vote_average {
            Some(average) if average > 0.0 => format!("{average:.1}"),
            _ => sentinel("Rating"),
        };

        let runtime = match details.runtime {
            Some(minutes) if minutes > 0 => format!("{minutes} min"),
            _ => sentinel("Runtime"),
        };

        let genre = if details.genres.is_empty() {
            sentinel("Genre")
        } else {
            details
                .genres
                .iter()
                .map(|g| g.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let credits = details.credits.unwrap_or_default();

        let cast = if credits.cast.is_empty() {
            sentinel("Cast")
        } else {
            credits
                .cast
                .iter()
                .take(CAST_LIMIT)
                .map(|member| member.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let director = credits
            .crew
            .iter()
            .find(|member| member.job == "Director")
            .map(|member| member.name.clone())
            .unwrap_or_else(|| sentinel("Director"));

        let plot = details
            .overview
            .filter(|overview| !overview.trim().is_empty())
            .unwrap_or_else(|| sentinel("Plot"));

        MovieRecord {
            title: details.title,
            year,
            plot,
            cast,
            runtime,
            genre,
            director,
            rating,
            external_id: details.imdb_id.filter(|id| !id.is_empty()),
            provider_id: Some(details.id),
            provider: "tmdb".to_string(),
        }
    }
}

/// Region block from TMDB `/movie/{id}/watch/providers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbWatchRegion {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<TmdbWatchOffer>,
    #[serde(default)]
    pub rent: Vec<TmdbWatchOffer>,
    #[serde(default)]
    pub buy: Vec<TmdbWatchOffer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbWatchOffer {
    pub provider_name: String,
}

impl From<TmdbWatchRegion> for StreamingAvailability {
    fn from(region: TmdbWatchRegion) -> Self {
        let deep_link = region
            .link
            .filter(|link| link.starts_with("http://") || link.starts_with("https://"));

        StreamingAvailability {
            subscription: offer_names(region.flatrate, usize::MAX),
            rent: offer_names(region.rent, RENT_BUY_LIMIT),
            buy: offer_names(region.buy, RENT_BUY_LIMIT),
            deep_link,
        }
    }
}

fn offer_names(offers: Vec<TmdbWatchOffer>, cap: usize) -> Vec<String> {
    offers
        .into_iter()
        .take(cap)
        .map(|offer| offer.provider_name)
        .collect()
}

// ============================================================================
// Request / Response Types
// ============================================================================

/// Request to generate shared recommendations for a pair.
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    /// Session to bill the request against; the server mints one when absent.
    #[serde(default)]
    pub session_id: Option<Uuid>,
    pub partner_a: Vec<String>,
    pub partner_b: Vec<String>,
    /// Also produce a per-partner taste analysis.
    #[serde(default)]
    pub include_analysis: bool,
}

/// Request to dismiss a displayed recommendation.
#[derive(Debug, Deserialize)]
pub struct ViewedRequest {
    pub session_id: Uuid,
    /// The candidate title exactly as the window reported it.
    pub title: String,
}

/// A single enriched recommendation as displayed to the pair.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationCard {
    /// The title as the model suggested it. This is the rotation key; echo it
    /// back verbatim when marking the card viewed.
    pub title: String,
    pub details: MovieRecord,
    pub availability: Option<StreamingAvailability>,
    /// False when resolution failed and `details` is a placeholder.
    pub enriched: bool,
}

/// Response for generation, dismissal, and window reads.
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub session_id: Uuid,
    /// Present only when analysis was requested and at least one profile
    /// could be written.
    pub analysis: Option<Vec<TasteAnalysis>>,
    pub window: Vec<RecommendationCard>,
    pub total_candidates: usize,
    pub remaining: usize,
}
