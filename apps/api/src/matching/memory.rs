//! In-memory repositories and fixtures for engine and router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::engine::Recommendation;
use crate::matching::repository::{CompanyRepository, ConsultantRepository, RecommendationStore};
use crate::models::company::{CompanyRow, DimensionScore, SelfAssessmentRow};
use crate::models::consultant::ConsultantRow;
use crate::models::recommendation::MatchingRecommendationRow;

#[derive(Default)]
pub struct InMemoryRepository {
    companies: HashMap<Uuid, (CompanyRow, Option<SelfAssessmentRow>)>,
    consultants: Vec<ConsultantRow>,
    recommendations: Mutex<Vec<MatchingRecommendationRow>>,
    /// company id → matching_status, as the Pg store would set it.
    statuses: Mutex<HashMap<Uuid, String>>,
    batches: Mutex<usize>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_company(mut self, company: CompanyRow, assessment: Option<SelfAssessmentRow>) -> Self {
        self.companies.insert(company.id, (company, assessment));
        self
    }

    pub fn with_consultants(mut self, consultants: Vec<ConsultantRow>) -> Self {
        self.consultants = consultants;
        self
    }

    /// Seeds stored rows directly, bypassing `save_batch`.
    pub fn with_rows(self, rows: Vec<MatchingRecommendationRow>) -> Self {
        self.recommendations.lock().unwrap().extend(rows);
        self
    }

    pub fn saved_batches(&self) -> usize {
        *self.batches.lock().unwrap()
    }

    pub fn matching_status(&self, company_id: Uuid) -> Option<String> {
        self.statuses.lock().unwrap().get(&company_id).cloned()
    }

    pub fn all_rows(&self) -> Vec<MatchingRecommendationRow> {
        self.recommendations.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompanyRepository for InMemoryRepository {
    async fn find_company(&self, company_id: Uuid) -> Result<Option<CompanyRow>, AppError> {
        Ok(self.companies.get(&company_id).map(|(c, _)| c.clone()))
    }

    async fn latest_self_assessment(
        &self,
        company_id: Uuid,
    ) -> Result<Option<SelfAssessmentRow>, AppError> {
        Ok(self
            .companies
            .get(&company_id)
            .and_then(|(_, a)| a.clone()))
    }
}

#[async_trait]
impl ConsultantRepository for InMemoryRepository {
    async fn list_consultants(&self) -> Result<Vec<ConsultantRow>, AppError> {
        Ok(self.consultants.clone())
    }
}

#[async_trait]
impl RecommendationStore for InMemoryRepository {
    async fn save_batch(
        &self,
        company_id: Uuid,
        recommendations: &[Recommendation],
        preserve_status: bool,
    ) -> Result<Uuid, AppError> {
        let batch_id = Uuid::new_v4();
        let now = Utc::now();
        let mut rows = self.recommendations.lock().unwrap();
        for row in rows.iter_mut() {
            if row.company_id == company_id && row.superseded_at.is_none() {
                row.superseded_at = Some(now);
            }
        }
        rows.extend(recommendations.iter().map(|rec| MatchingRecommendationRow {
            id: Uuid::new_v4(),
            batch_id,
            company_id,
            consultant_id: rec.candidate_user_id,
            total_score: rec.total_score,
            score_breakdown: Json(rec.score_breakdown.clone()),
            rationale: rec.rationale.clone(),
            rank: rec.rank as i32,
            created_at: now,
            superseded_at: None,
        }));
        if !preserve_status {
            self.statuses
                .lock()
                .unwrap()
                .insert(company_id, "RECOMMENDED".to_string());
        }
        *self.batches.lock().unwrap() += 1;
        Ok(batch_id)
    }

    async fn latest_batch(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<MatchingRecommendationRow>, AppError> {
        let rows = self.recommendations.lock().unwrap();
        let newest = rows
            .iter()
            .filter(|r| r.company_id == company_id && r.superseded_at.is_none())
            .max_by_key(|r| (r.created_at, r.batch_id))
            .map(|r| r.batch_id);

        let mut batch: Vec<_> = rows
            .iter()
            .filter(|r| Some(r.batch_id) == newest)
            .cloned()
            .collect();
        batch.sort_by_key(|r| r.rank);
        Ok(batch)
    }
}

/// 제조업, medium size, two focus domains.
pub fn company() -> CompanyRow {
    CompanyRow {
        id: Uuid::new_v4(),
        name: "한빛정밀".to_string(),
        industry: "제조업".to_string(),
        sub_industries: vec!["자동차 부품".to_string()],
        company_size: "medium".to_string(),
        focus_domains: vec!["스마트 팩토리".to_string(), "품질 예측".to_string()],
    }
}

/// Near-max on two dimensions, so no dimension is weak.
pub fn perfect_assessment(company_id: Uuid) -> SelfAssessmentRow {
    SelfAssessmentRow {
        id: Uuid::new_v4(),
        company_id,
        total_score: 19.5,
        max_possible_score: 20.0,
        dimension_scores: Json(vec![
            DimensionScore {
                dimension: "전략".to_string(),
                score: 9.5,
                max_score: 10.0,
            },
            DimensionScore {
                dimension: "데이터".to_string(),
                score: 10.0,
                max_score: 10.0,
            },
        ]),
        completed_at: Utc::now(),
    }
}

/// Eligible, middling consultant named `c{id}` with user id `id`.
pub fn consultant(id: u128) -> ConsultantRow {
    ConsultantRow {
        user_id: Uuid::from_u128(id),
        name: format!("c{id}"),
        status: "ACTIVE".to_string(),
        role: "CONSULTANT".to_string(),
        expertise_domains: vec!["스마트 팩토리".to_string()],
        available_industries: vec!["유통".to_string()],
        sub_industries: Some(vec!["자동차 정비".to_string()]),
        teaching_levels: vec!["INTERMEDIATE".to_string()],
        coaching_methods: vec!["그룹 강의".to_string()],
        skill_tags: vec!["데이터 분석".to_string(), "파이썬".to_string()],
        years_of_experience: 5,
    }
}
