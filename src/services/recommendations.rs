//! Recommendation generation
//!
//! Orchestrates the request pipeline: rate limiting, validation,
//! sanitization, the chat-model call, rotation bookkeeping, and metadata
//! enrichment of the visible window.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{MovieRecord, RecommendationCard, RecommendationResponse},
    pipeline::{
        rate_limit::{RateDecision, RateLimitConfig},
        rotation::{Rotation, CANDIDATE_COUNT},
        sanitize::{escape_html, sanitize_for_prompt, SanitizedTitle},
        validate::validate_pair,
    },
    redact,
    services::{analysis, llm::ChatCompleter, metadata::MetadataResolver},
    session::SessionStore,
};

const RECOMMENDATION_TOKENS: u32 = 300;

const SYSTEM_PROMPT: &str = "You are a knowledgeable film critic who can identify \
     cinematic commonalities between different movie preferences.";

/// Shown to a session the first time a given model failure occurs.
const LLM_NOTICE: &str = "The recommendation service is unavailable right now. \
     Try again in a moment or switch to a different model.";

/// Shown when the model replied but no titles could be parsed out.
const EMPTY_NOTICE: &str =
    "Couldn't generate recommendations. Please try again with different movies.";

/// Runs the full pipeline for one recommendation request.
///
/// The rate limiter is consulted before any validation or upstream call, so
/// abusive traffic is shed at the door. Candidate titles come back raw from
/// the model and double as rotation keys.
#[allow(clippy::too_many_arguments)]
pub async fn generate(
    sessions: &SessionStore,
    limits: &RateLimitConfig,
    llm: Arc<dyn ChatCompleter>,
    resolver: &MetadataResolver,
    session_id: Uuid,
    partner_a: &[String],
    partner_b: &[String],
    include_analysis: bool,
) -> AppResult<RecommendationResponse> {
    let decision = sessions
        .with_session(session_id, |state| state.rate.check(limits, Utc::now()))
        .await;
    if let RateDecision::Blocked {
        message,
        retry_after_secs,
    } = decision
    {
        tracing::warn!(
            session_id = %session_id,
            retry_after_secs,
            "Session rate limited"
        );
        return Err(AppError::RateLimited(message));
    }

    validate_pair(partner_a, partner_b)?;

    let originals_a = non_empty(partner_a);
    let originals_b = non_empty(partner_b);
    let sanitized_a: Vec<SanitizedTitle> =
        originals_a.iter().map(|t| sanitize_for_prompt(t)).collect();
    let sanitized_b: Vec<SanitizedTitle> =
        originals_b.iter().map(|t| sanitize_for_prompt(t)).collect();

    let prompt = recommendation_prompt(&sanitized_a, &sanitized_b);
    let reply = match llm.complete(SYSTEM_PROMPT, &prompt, RECOMMENDATION_TOKENS).await {
        Ok(reply) => reply,
        Err(e) => return Err(llm_error(sessions, session_id, &e.to_string()).await),
    };

    let candidates = parse_recommendation_list(&reply);
    if candidates.is_empty() {
        return Err(llm_error(sessions, session_id, "empty-candidates").await);
    }

    tracing::info!(
        session_id = %session_id,
        candidates = candidates.len(),
        "Generated recommendation candidates"
    );

    let analysis = if include_analysis {
        let mut profiles = Vec::new();
        let partners = [
            ("Movie Lover 1", &originals_a, &sanitized_a),
            ("Movie Lover 2", &originals_b, &sanitized_b),
        ];
        for (label, originals, sanitized) in partners {
            match analysis::analyze_selection(llm.as_ref(), label, originals, sanitized).await {
                Ok(profile) => profiles.push(profile),
                Err(e) => tracing::warn!(
                    session_id = %session_id,
                    partner = label,
                    error = %redact::scrub(&e.to_string()),
                    "Taste analysis failed"
                ),
            }
        }
        (!profiles.is_empty()).then_some(profiles)
    } else {
        None
    };

    let (window, total_candidates, remaining) = sessions
        .with_session(session_id, |state| {
            state.rotation.set_candidates(candidates);
            snapshot(&state.rotation)
        })
        .await;

    Ok(RecommendationResponse {
        session_id,
        analysis,
        window: enrich_window(resolver, &window).await,
        total_candidates,
        remaining,
    })
}

/// Dismisses one title from the session's rotation and returns the refreshed
/// window. Unknown or already-viewed titles are ignored.
pub async fn mark_viewed(
    sessions: &SessionStore,
    resolver: &MetadataResolver,
    session_id: Uuid,
    title: &str,
) -> RecommendationResponse {
    let (acknowledged, (window, total_candidates, remaining)) = sessions
        .with_session(session_id, |state| {
            let acknowledged = state.rotation.mark_viewed(title);
            (acknowledged, snapshot(&state.rotation))
        })
        .await;

    if !acknowledged {
        tracing::debug!(
            session_id = %session_id,
            title = %title,
            "Viewed title not in rotation"
        );
    }

    RecommendationResponse {
        session_id,
        analysis: None,
        window: enrich_window(resolver, &window).await,
        total_candidates,
        remaining,
    }
}

/// Read-only view of the session's current window.
pub async fn current_window(
    sessions: &SessionStore,
    resolver: &MetadataResolver,
    session_id: Uuid,
) -> RecommendationResponse {
    let (window, total_candidates, remaining) = sessions
        .with_session(session_id, |state| snapshot(&state.rotation))
        .await;

    RecommendationResponse {
        session_id,
        analysis: None,
        window: enrich_window(resolver, &window).await,
        total_candidates,
        remaining,
    }
}

/// Extracts titles from a numbered reply. A line contributes everything
/// after its first `". "`, so `"1. The Matrix"` yields `"The Matrix"` and
/// unnumbered commentary lines drop out.
pub fn parse_recommendation_list(reply: &str) -> Vec<String> {
    reply
        .lines()
        .filter_map(|line| line.split_once(". ").map(|(_, title)| title.trim()))
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(titles: &[String]) -> Vec<String> {
    titles
        .iter()
        .filter(|title| !title.trim().is_empty())
        .cloned()
        .collect()
}

fn recommendation_prompt(partner_a: &[SanitizedTitle], partner_b: &[SanitizedTitle]) -> String {
    let a = join_titles(partner_a);
    let b = join_titles(partner_b);
    format!(
        "Based on the following favorite movies of two people, recommend \
         {CANDIDATE_COUNT} specific movies that both would enjoy watching together. \
         Respond with a numbered list of movie titles only, one per line.\n\n\
         Partner 1's favorite movies: {a}\n\
         Partner 2's favorite movies: {b}\n\n\
         Recommendations:\n1. "
    )
}

fn join_titles(titles: &[SanitizedTitle]) -> String {
    titles
        .iter()
        .map(SanitizedTitle::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn snapshot(rotation: &Rotation) -> (Vec<String>, usize, usize) {
    (
        rotation.current_window(),
        rotation.candidate_count(),
        rotation.remaining(),
    )
}

async fn enrich_window(resolver: &MetadataResolver, titles: &[String]) -> Vec<RecommendationCard> {
    let mut cards = Vec::with_capacity(titles.len());
    for title in titles {
        cards.push(build_card(resolver, title).await);
    }
    cards
}

/// Card details are always escaped; the card title stays verbatim so it can
/// round-trip through a viewed request.
async fn build_card(resolver: &MetadataResolver, title: &str) -> RecommendationCard {
    match resolver.enrich(title).await {
        Some((details, availability)) => RecommendationCard {
            title: title.to_string(),
            details,
            availability,
            enriched: true,
        },
        None => RecommendationCard {
            title: title.to_string(),
            details: MovieRecord::placeholder(&escape_html(title)),
            availability: None,
            enriched: false,
        },
    }
}

/// Records a model failure against the session and builds the 503. The
/// human-readable notice rides along only the first time this session sees
/// this particular failure.
async fn llm_error(sessions: &SessionStore, session_id: Uuid, detail: &str) -> AppError {
    let signature = redact::scrub(detail);
    let first_time = sessions
        .with_session(session_id, |state| {
            state.surfaced_llm_errors.insert(signature.clone())
        })
        .await;

    tracing::error!(
        session_id = %session_id,
        error = %signature,
        "Recommendation model call failed"
    );

    let notice_text = if signature == "empty-candidates" {
        EMPTY_NOTICE
    } else {
        LLM_NOTICE
    };

    AppError::Llm {
        notice: first_time.then(|| notice_text.to_string()),
    }
}
