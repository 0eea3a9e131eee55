//! Axum route handlers for the Matching API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::engine::{MatchRequest, MatchStatus, Recommendation};
use crate::models::recommendation::MatchingRecommendationRow;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRecommendationsRequest {
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub preserve_status: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateRecommendationsResponse {
    pub company_id: Uuid,
    /// `None` when nothing was generated and no batch was stored.
    pub batch_id: Option<Uuid>,
    pub status: MatchStatus,
    pub eligible_count: usize,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct LatestRecommendationsResponse {
    pub company_id: Uuid,
    pub batch_id: Uuid,
    pub recommendations: Vec<MatchingRecommendationRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/companies/:company_id/recommendations
///
/// Runs the matching engine and stores the batch when it is non-empty.
/// An empty pool yields `status: "no_recommendations"` with 200, not an error.
pub async fn handle_generate_recommendations(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(request): Json<GenerateRecommendationsRequest>,
) -> Result<Json<GenerateRecommendationsResponse>, AppError> {
    let match_request = MatchRequest::new(
        company_id,
        request.top_n,
        state.config.default_top_n,
        request.preserve_status,
    )?;

    let outcome = state
        .engine
        .recommend(
            state.companies.as_ref(),
            state.consultants.as_ref(),
            &match_request,
        )
        .await?;

    let batch_id = if outcome.recommendations.is_empty() {
        info!("No recommendations generated for company {company_id}; nothing stored");
        None
    } else {
        Some(
            state
                .recommendations
                .save_batch(
                    company_id,
                    &outcome.recommendations,
                    match_request.preserve_status,
                )
                .await?,
        )
    };

    Ok(Json(GenerateRecommendationsResponse {
        company_id,
        batch_id,
        status: outcome.status,
        eligible_count: outcome.eligible_count,
        recommendations: outcome.recommendations,
    }))
}

/// GET /api/v1/companies/:company_id/recommendations
///
/// Returns the live batch for the company, ordered by rank.
pub async fn handle_get_recommendations(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<LatestRecommendationsResponse>, AppError> {
    let recommendations = state.recommendations.latest_batch(company_id).await?;

    let batch_id = recommendations
        .first()
        .map(|r| r.batch_id)
        .ok_or_else(|| {
            AppError::NotFound(format!("No recommendations for company {company_id}"))
        })?;

    Ok(Json(LatestRecommendationsResponse {
        company_id,
        batch_id,
        recommendations,
    }))
}
