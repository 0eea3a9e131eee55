use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const ELIGIBLE_STATUS: &str = "ACTIVE";
pub const ELIGIBLE_ROLE: &str = "CONSULTANT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeachingLevel {
    Beginner,
    Intermediate,
    Advanced,
    Leader,
}

impl TeachingLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "BEGINNER" => Some(TeachingLevel::Beginner),
            "INTERMEDIATE" => Some(TeachingLevel::Intermediate),
            "ADVANCED" => Some(TeachingLevel::Advanced),
            "LEADER" => Some(TeachingLevel::Leader),
            _ => None,
        }
    }

    /// Levels one step apart (BEGINNER/INTERMEDIATE, ...) are adjacent.
    pub fn is_adjacent(self, other: TeachingLevel) -> bool {
        (self as i8 - other as i8).abs() == 1
    }
}

/// A consultant user joined with their profile, as read from the store.
/// Arrays are free-text tags; they are normalized before any comparison.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConsultantRow {
    pub user_id: Uuid,
    pub name: String,
    pub status: String,
    pub role: String,
    pub expertise_domains: Vec<String>,
    pub available_industries: Vec<String>,
    pub sub_industries: Option<Vec<String>>,
    pub teaching_levels: Vec<String>,
    pub coaching_methods: Vec<String>,
    pub skill_tags: Vec<String>,
    pub years_of_experience: i32,
}

impl ConsultantRow {
    /// Active, approved consultant with every required profile array filled in.
    pub fn is_eligible(&self) -> bool {
        self.status.eq_ignore_ascii_case(ELIGIBLE_STATUS)
            && self.role.eq_ignore_ascii_case(ELIGIBLE_ROLE)
            && self.missing_required_field().is_none()
    }

    /// Name of the first required array that has no non-blank entry.
    pub fn missing_required_field(&self) -> Option<&'static str> {
        let required: [(&'static str, &[String]); 4] = [
            ("expertise_domains", self.expertise_domains.as_slice()),
            ("available_industries", self.available_industries.as_slice()),
            ("teaching_levels", self.teaching_levels.as_slice()),
            ("skill_tags", self.skill_tags.as_slice()),
        ];
        required
            .into_iter()
            .find(|(_, values)| values.iter().all(|v| v.trim().is_empty()))
            .map(|(name, _)| name)
    }
}
