//! Collaborator seams for the matching engine.
//!
//! The engine reads companies and consultants through the two read-only traits and
//! never writes. `RecommendationStore` persists a finished batch. None of these
//! touch assignment rows; `preserve_status` only decides whether the company's
//! matching status is bumped.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::engine::Recommendation;
use crate::models::company::{CompanyRow, SelfAssessmentRow};
use crate::models::consultant::{ConsultantRow, ELIGIBLE_ROLE};
use crate::models::recommendation::MatchingRecommendationRow;

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn find_company(&self, company_id: Uuid) -> Result<Option<CompanyRow>, AppError>;

    /// Most recent completed self-assessment, if any.
    async fn latest_self_assessment(
        &self,
        company_id: Uuid,
    ) -> Result<Option<SelfAssessmentRow>, AppError>;
}

#[async_trait]
pub trait ConsultantRepository: Send + Sync {
    /// All consultant users with a profile. Eligibility is decided by the engine.
    async fn list_consultants(&self) -> Result<Vec<ConsultantRow>, AppError>;
}

#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Supersedes the company's live batch and stores `recommendations` as the new one.
    async fn save_batch(
        &self,
        company_id: Uuid,
        recommendations: &[Recommendation],
        preserve_status: bool,
    ) -> Result<Uuid, AppError>;

    /// Live (non-superseded) batch for the company, ordered by rank.
    async fn latest_batch(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<MatchingRecommendationRow>, AppError>;
}

/// PostgreSQL implementation of all three seams.
#[derive(Clone)]
pub struct PgMatchingRepository {
    pool: PgPool,
}

impl PgMatchingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PgMatchingRepository {
    async fn find_company(&self, company_id: Uuid) -> Result<Option<CompanyRow>, AppError> {
        Ok(sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT id, name, industry,
                   COALESCE(sub_industries, '{}') AS sub_industries,
                   company_size,
                   COALESCE(focus_domains, '{}') AS focus_domains
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn latest_self_assessment(
        &self,
        company_id: Uuid,
    ) -> Result<Option<SelfAssessmentRow>, AppError> {
        Ok(sqlx::query_as::<_, SelfAssessmentRow>(
            r#"
            SELECT id, company_id, total_score, max_possible_score, dimension_scores, completed_at
            FROM self_assessments
            WHERE company_id = $1 AND completed_at IS NOT NULL
            ORDER BY completed_at DESC
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}

#[async_trait]
impl ConsultantRepository for PgMatchingRepository {
    async fn list_consultants(&self) -> Result<Vec<ConsultantRow>, AppError> {
        Ok(sqlx::query_as::<_, ConsultantRow>(
            r#"
            SELECT u.id AS user_id, u.name, u.status, u.role,
                   p.expertise_domains, p.available_industries, p.sub_industries,
                   p.teaching_levels,
                   COALESCE(p.coaching_methods, '{}') AS coaching_methods,
                   p.skill_tags, p.years_of_experience
            FROM users u
            JOIN consultant_profiles p ON p.user_id = u.id
            WHERE u.role = $1
            ORDER BY u.id
            "#,
        )
        .bind(ELIGIBLE_ROLE)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl RecommendationStore for PgMatchingRepository {
    async fn save_batch(
        &self,
        company_id: Uuid,
        recommendations: &[Recommendation],
        preserve_status: bool,
    ) -> Result<Uuid, AppError> {
        let batch_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        // Row lock on the company serializes concurrent saves, so the supersede
        // below always sees the batch committed by the previous writer.
        sqlx::query("SELECT id FROM companies WHERE id = $1 FOR UPDATE")
            .bind(company_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Company {company_id} not found")))?;

        let superseded = sqlx::query(
            r#"
            UPDATE matching_recommendations
            SET superseded_at = NOW()
            WHERE company_id = $1 AND superseded_at IS NULL
            "#,
        )
        .bind(company_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        for rec in recommendations {
            sqlx::query(
                r#"
                INSERT INTO matching_recommendations
                    (id, batch_id, company_id, consultant_id, total_score,
                     score_breakdown, rationale, rank)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(batch_id)
            .bind(company_id)
            .bind(rec.candidate_user_id)
            .bind(rec.total_score)
            .bind(Json(&rec.score_breakdown))
            .bind(&rec.rationale)
            .bind(rec.rank as i32)
            .execute(&mut *tx)
            .await?;
        }

        if !preserve_status {
            sqlx::query("UPDATE companies SET matching_status = 'RECOMMENDED' WHERE id = $1")
                .bind(company_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            "Saved recommendation batch {batch_id} for company {company_id}: {} rows, {superseded} superseded, preserve_status={preserve_status}",
            recommendations.len()
        );
        Ok(batch_id)
    }

    async fn latest_batch(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<MatchingRecommendationRow>, AppError> {
        Ok(sqlx::query_as::<_, MatchingRecommendationRow>(
            r#"
            SELECT *
            FROM matching_recommendations
            WHERE batch_id = (
                SELECT batch_id
                FROM matching_recommendations
                WHERE company_id = $1 AND superseded_at IS NULL
                ORDER BY created_at DESC, batch_id DESC
                LIMIT 1
            )
            ORDER BY rank
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
