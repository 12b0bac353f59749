use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{RecommendationRequest, RecommendationResponse, ViewedRequest},
    services::recommendations,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    session_id: Uuid,
}

/// Handler for recommendation generation
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let session_id = request.session_id.unwrap_or_else(Uuid::new_v4);

    tracing::info!(
        request_id = %request_id,
        session_id = %session_id,
        partner_a_count = request.partner_a.len(),
        partner_b_count = request.partner_b.len(),
        "Processing recommendation request"
    );

    let response = recommendations::generate(
        &state.sessions,
        &state.limits,
        state.llm.clone(),
        &state.resolver,
        session_id,
        &request.partner_a,
        &request.partner_b,
        request.include_analysis,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        session_id = %session_id,
        window = response.window.len(),
        remaining = response.remaining,
        "Recommendations ready"
    );

    Ok(Json(response))
}

/// Handler for dismissing a displayed recommendation
pub async fn viewed(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ViewedRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        session_id = %request.session_id,
        "Marking recommendation viewed"
    );

    let response = recommendations::mark_viewed(
        &state.sessions,
        &state.resolver,
        request.session_id,
        &request.title,
    )
    .await;

    Ok(Json(response))
}

/// Handler for reading the current window without mutating it
pub async fn window(
    State(state): State<AppState>,
    Query(params): Query<WindowQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let response =
        recommendations::current_window(&state.sessions, &state.resolver, params.session_id).await;

    Ok(Json(response))
}
