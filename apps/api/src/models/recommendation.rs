use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One criterion's contribution to a candidate's total score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub criteria: String,
    pub score: f64,
    pub max_score: f64,
    pub explanation: String,
}

/// A persisted recommendation. Rows are never updated except to mark them
/// superseded when a later batch for the same company is saved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchingRecommendationRow {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub company_id: Uuid,
    pub consultant_id: Uuid,
    pub total_score: f64,
    pub score_breakdown: Json<Vec<ScoreBreakdown>>,
    pub rationale: String,
    pub rank: i32,
    pub created_at: DateTime<Utc>,
    pub superseded_at: Option<DateTime<Utc>>,
}
