//! Matching rules: the tunable parameters behind every criterion scorer.
//!
//! Defaults mirror the 100-point breakdown shown in the dashboard
//! (industry 30 / expertise 25 / skill 20 / experience 15 / availability 10).
//! A JSON file at `MATCHING_RULES_PATH` may override any subset of fields.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::company::CompanySize;

/// Total points across all criteria. Totals and rationale are on this scale.
pub const TOTAL_POINTS: f64 = 100.0;

/// Maximum points per criterion. The maxima act as the weights; totals are sums,
/// so the weights must add up to `TOTAL_POINTS`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CriterionWeights {
    pub industry: f64,
    pub expertise: f64,
    pub skill: f64,
    pub experience: f64,
    pub availability: f64,
}

impl Default for CriterionWeights {
    fn default() -> Self {
        Self {
            industry: 30.0,
            expertise: 25.0,
            skill: 20.0,
            experience: 15.0,
            availability: 10.0,
        }
    }
}

impl CriterionWeights {
    pub fn sum(&self) -> f64 {
        self.industry + self.expertise + self.skill + self.experience + self.availability
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingRules {
    pub weights: CriterionWeights,
    /// Fraction of the industry max granted per related sub-industry tag.
    pub industry_partial_per_overlap: f64,
    /// Ceiling (fraction of max) for the sub-industry bonus without an exact match.
    pub industry_partial_cap: f64,
    /// Tokens too generic to relate two industry tags on their own ("서비스", "산업").
    pub industry_generic_tokens: Vec<String>,
    /// Required domains used when the company has no focus domains on file.
    pub default_domains: Vec<String>,
    /// Dimensions whose score ratio is below this are treated as weak.
    pub weak_dimension_threshold: f64,
    /// Self-assessment dimension → skill tags that address it.
    pub dimension_skill_tags: BTreeMap<String, Vec<String>>,
    pub experience_saturation_years: u32,
    /// Share of the availability max driven by teaching level; the rest is coaching method.
    pub teaching_level_share: f64,
    pub size_coaching_methods: BTreeMap<CompanySize, Vec<String>>,
}

impl Default for MatchingRules {
    fn default() -> Self {
        let tags = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            weights: CriterionWeights::default(),
            industry_partial_per_overlap: 0.25,
            industry_partial_cap: 0.8,
            industry_generic_tokens: tags(&["서비스", "업", "산업", "개발", "기타"]),
            default_domains: tags(&["AI 전략", "업무 자동화", "데이터 분석"]),
            weak_dimension_threshold: 0.6,
            dimension_skill_tags: BTreeMap::from([
                ("전략".to_string(), tags(&["AI 전략", "디지털 전환"])),
                ("데이터".to_string(), tags(&["데이터 분석", "데이터 거버넌스"])),
                ("기술".to_string(), tags(&["머신러닝", "생성형 AI"])),
                ("인재".to_string(), tags(&["AI 교육", "리스킬링"])),
                ("프로세스".to_string(), tags(&["업무 자동화", "프로세스 혁신"])),
                ("문화".to_string(), tags(&["변화 관리", "리더십 코칭"])),
            ]),
            experience_saturation_years: 10,
            teaching_level_share: 0.7,
            size_coaching_methods: BTreeMap::from([
                (CompanySize::Micro, tags(&["1:1 코칭", "실습 워크숍"])),
                (CompanySize::Small, tags(&["1:1 코칭", "실습 워크숍"])),
                (CompanySize::Medium, tags(&["실습 워크숍", "그룹 강의"])),
                (CompanySize::Large, tags(&["그룹 강의", "리더십 세미나", "실습 워크숍"])),
            ]),
        }
    }
}

impl MatchingRules {
    /// Loads rules from a JSON file, or the built-in defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let rules = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read matching rules from '{path}'"))?;
                Self::from_json(&raw)
                    .with_context(|| format!("Failed to parse matching rules in '{path}'"))?
            }
            None => Self::default(),
        };
        rules.validate()?;
        Ok(rules)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [
            ("industry", w.industry),
            ("expertise", w.expertise),
            ("skill", w.skill),
            ("experience", w.experience),
            ("availability", w.availability),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("weight '{name}' must be a non-negative number, got {value}");
            }
        }
        if (w.sum() - TOTAL_POINTS).abs() > 1e-6 {
            bail!(
                "criterion weights must add up to {TOTAL_POINTS}, got {}",
                w.sum()
            );
        }
        for (name, value) in [
            ("industry_partial_per_overlap", self.industry_partial_per_overlap),
            ("industry_partial_cap", self.industry_partial_cap),
            ("weak_dimension_threshold", self.weak_dimension_threshold),
            ("teaching_level_share", self.teaching_level_share),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("'{name}' must be within [0, 1], got {value}");
            }
        }
        if self.experience_saturation_years == 0 {
            bail!("experience_saturation_years must be at least 1");
        }
        Ok(())
    }
}
