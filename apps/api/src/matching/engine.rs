//! Matching engine: orchestrates one recommendation run for one company.
//!
//! Flow: load company + self-assessment → normalize → load consultant pool →
//!       filter eligible → score every candidate → rank/truncate →
//!       compose rationale for the survivors (bounded concurrency) → return.
//!
//! The engine reads through repositories and never writes; persisting the batch is
//! the caller's job via `RecommendationStore`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::criteria::score_all;
use crate::matching::normalizer::{normalize_candidate, normalize_company, FeatureSet};
use crate::matching::ranker::{rank, RankedCandidate, ScoredCandidate};
use crate::matching::rationale::{select_highlights, templated_rationale, RationaleComposer};
use crate::matching::repository::{CompanyRepository, ConsultantRepository};
use crate::matching::rules::MatchingRules;
use crate::models::recommendation::ScoreBreakdown;

pub const MAX_TOP_N: usize = 10;

#[derive(Debug, Clone)]
pub struct MatchRequest {
    pub company_id: Uuid,
    pub top_n: usize,
    pub preserve_status: bool,
}

impl MatchRequest {
    /// Validates `top_n` (1..=10), substituting `default_top_n` when absent.
    pub fn new(
        company_id: Uuid,
        top_n: Option<usize>,
        default_top_n: usize,
        preserve_status: bool,
    ) -> Result<Self, AppError> {
        let top_n = top_n.unwrap_or(default_top_n);
        if !(1..=MAX_TOP_N).contains(&top_n) {
            return Err(AppError::Validation(format!(
                "top_n must be between 1 and {MAX_TOP_N}, got {top_n}"
            )));
        }
        Ok(Self {
            company_id,
            top_n,
            preserve_status,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Generated,
    /// No eligible candidate; an empty, successful outcome.
    NoRecommendations,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub candidate_user_id: Uuid,
    pub candidate_name: String,
    pub total_score: f64,
    pub score_breakdown: Vec<ScoreBreakdown>,
    pub rationale: String,
    pub rank: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    pub company_id: Uuid,
    pub status: MatchStatus,
    pub pool_size: usize,
    pub eligible_count: usize,
    pub recommendations: Vec<Recommendation>,
}

pub struct MatchingEngine {
    rules: Arc<MatchingRules>,
    composer: RationaleComposer,
    concurrency: usize,
}

impl MatchingEngine {
    pub fn new(rules: MatchingRules, composer: RationaleComposer, concurrency: usize) -> Self {
        Self {
            rules: Arc::new(rules),
            composer,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs one matching pass. Fails only on precondition violations
    /// (unknown company, missing self-assessment, malformed records).
    pub async fn recommend(
        &self,
        companies: &dyn CompanyRepository,
        consultants: &dyn ConsultantRepository,
        request: &MatchRequest,
    ) -> Result<MatchOutcome, AppError> {
        let company_id = request.company_id;

        let company = companies
            .find_company(company_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Company {company_id} not found")))?;
        let assessment = companies.latest_self_assessment(company_id).await?;
        let company_features = normalize_company(&company, assessment.as_ref(), &self.rules)?;

        let pool = consultants.list_consultants().await?;
        let pool_size = pool.len();

        let mut scored = Vec::new();
        for row in &pool {
            if !row.is_eligible() {
                debug!(
                    "Skipping consultant {} (status={}, role={}, missing={:?})",
                    row.user_id,
                    row.status,
                    row.role,
                    row.missing_required_field()
                );
                continue;
            }
            let features = FeatureSet::new(&company_features, normalize_candidate(row)?);
            let scores = score_all(&features, &self.rules)?;
            scored.push(ScoredCandidate::new(
                features.candidate.user_id,
                features.candidate.name.clone(),
                scores,
            ));
        }
        let eligible_count = scored.len();

        let ranked = rank(scored, request.top_n);
        let recommendations = self.compose_all(ranked).await;

        let status = if recommendations.is_empty() {
            MatchStatus::NoRecommendations
        } else {
            MatchStatus::Generated
        };

        info!(
            "Matching for company {company_id}: pool={pool_size}, eligible={eligible_count}, returned={}, status={status:?}",
            recommendations.len()
        );

        Ok(MatchOutcome {
            company_id,
            status,
            pool_size,
            eligible_count,
            recommendations,
        })
    }

    /// Composes rationale for every ranked candidate, at most `concurrency` at once.
    /// Output keeps rank order; a task that dies leaves the templated rationale.
    async fn compose_all(&self, ranked: Vec<RankedCandidate>) -> Vec<Recommendation> {
        let mut rationales: Vec<String> = ranked
            .iter()
            .map(|r| templated_rationale(&r.candidate, &select_highlights(&r.candidate.scores)))
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, entry) in ranked.iter().enumerate() {
            let composer = self.composer.clone();
            let semaphore = semaphore.clone();
            let candidate = entry.candidate.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, composer.compose(&candidate).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, text)) => rationales[index] = text,
                Err(e) => error!("Rationale task failed, keeping template: {e}"),
            }
        }

        ranked
            .into_iter()
            .zip(rationales)
            .map(|(entry, rationale)| Recommendation {
                candidate_user_id: entry.candidate.user_id,
                candidate_name: entry.candidate.name,
                total_score: entry.candidate.total_score,
                score_breakdown: entry
                    .candidate
                    .scores
                    .iter()
                    .map(|s| s.to_breakdown())
                    .collect(),
                rationale,
                rank: entry.rank,
            })
            .collect()
    }
}
