use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Company size bucket as recorded on the company profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    Micro,
    Small,
    Medium,
    Large,
}

impl CompanySize {
    /// Parses the stored bucket label. Accepts the English keys and the Korean labels
    /// used by the onboarding form.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "micro" | "startup" | "스타트업" | "소상공인" => Some(CompanySize::Micro),
            "small" | "소기업" => Some(CompanySize::Small),
            "medium" | "중기업" | "중견기업" => Some(CompanySize::Medium),
            "large" | "enterprise" | "대기업" => Some(CompanySize::Large),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub industry: String,
    pub sub_industries: Vec<String>,
    pub company_size: String,
    /// Domain tags derived from the company's job tasks and pain points.
    pub focus_domains: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DimensionScore {
    pub dimension: String,
    pub score: f64,
    pub max_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SelfAssessmentRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub total_score: f64,
    pub max_possible_score: f64,
    pub dimension_scores: Json<Vec<DimensionScore>>,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_size_parses_korean_and_english() {
        assert_eq!(CompanySize::parse("대기업"), Some(CompanySize::Large));
        assert_eq!(CompanySize::parse(" Medium "), Some(CompanySize::Medium));
        assert_eq!(CompanySize::parse("소기업"), Some(CompanySize::Small));
        assert_eq!(CompanySize::parse("huge"), None);
    }
}
