//! Profile Normalizer: turns stored company, self-assessment, and consultant
//! records into comparable feature sets.
//!
//! Free-text tags are trimmed, whitespace-collapsed and lower-cased here. Nothing
//! downstream compares raw strings. The first spelling seen for each tag is kept
//! in a label map so explanations quote what the user actually wrote.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::rules::MatchingRules;
use crate::models::company::{CompanyRow, CompanySize, SelfAssessmentRow};
use crate::models::consultant::{ConsultantRow, TeachingLevel};

pub type TagSet = BTreeSet<String>;

/// Normalized tag → display spelling.
pub type TagLabels = BTreeMap<String, String>;

/// Company-side features, computed once per run and shared by every candidate.
#[derive(Debug, Clone)]
pub struct CompanyFeatures {
    pub industry: String,
    pub sub_industries: TagSet,
    pub size: CompanySize,
    /// score / max_score per dimension, clamped to [0, 1].
    pub dimension_ratios: BTreeMap<String, f64>,
    /// total_score / max_possible_score, clamped to [0, 1].
    pub maturity: f64,
    pub weak_dimensions: Vec<String>,
    pub required_domains: TagSet,
    pub target_skills: TagSet,
    /// Tokens ignored when relating industry tags.
    pub generic_industry_tokens: TagSet,
    pub labels: TagLabels,
}

impl CompanyFeatures {
    pub fn label<'a>(&'a self, tag: &'a str) -> &'a str {
        label_of(&self.labels, tag)
    }
}

#[derive(Debug, Clone)]
pub struct CandidateFeatures {
    pub user_id: Uuid,
    pub name: String,
    pub expertise_domains: TagSet,
    pub available_industries: TagSet,
    pub sub_industries: TagSet,
    pub teaching_levels: BTreeSet<TeachingLevel>,
    pub coaching_methods: TagSet,
    pub skill_tags: TagSet,
    pub years_of_experience: i32,
    pub labels: TagLabels,
}

impl CandidateFeatures {
    pub fn label<'a>(&'a self, tag: &'a str) -> &'a str {
        label_of(&self.labels, tag)
    }
}

/// Everything a criterion scorer may look at for one (company, candidate) pair.
#[derive(Debug, Clone)]
pub struct FeatureSet<'a> {
    pub company: &'a CompanyFeatures,
    pub candidate: CandidateFeatures,
    pub industry_match: bool,
    /// Candidate industry/sub-industry tags related to the company's industry or
    /// one of its sub-industries.
    pub related_industries: Vec<String>,
}

impl<'a> FeatureSet<'a> {
    pub fn new(company: &'a CompanyFeatures, candidate: CandidateFeatures) -> Self {
        let industry_match = candidate.available_industries.contains(&company.industry);

        let company_tags: Vec<&String> = std::iter::once(&company.industry)
            .chain(company.sub_industries.iter())
            .collect();

        let related_industries = candidate
            .available_industries
            .iter()
            .chain(candidate.sub_industries.iter())
            .filter(|tag| {
                company_tags
                    .iter()
                    .any(|c| tags_related(c, tag, &company.generic_industry_tokens))
            })
            .cloned()
            .collect::<TagSet>()
            .into_iter()
            .collect();

        Self {
            company,
            candidate,
            industry_match,
            related_industries,
        }
    }
}

/// Builds the company-side features.
///
/// Fails with `MissingSelfAssessment` when no completed assessment exists, and with
/// `InvalidInput` when the assessment breaks its own score invariants.
pub fn normalize_company(
    company: &CompanyRow,
    assessment: Option<&SelfAssessmentRow>,
    rules: &MatchingRules,
) -> Result<CompanyFeatures, AppError> {
    let assessment = assessment.ok_or(AppError::MissingSelfAssessment(company.id))?;
    validate_assessment(assessment)?;

    let size = CompanySize::parse(&company.company_size).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "company {} has unknown size bucket '{}'",
            company.id, company.company_size
        ))
    })?;

    let industry = normalize_tag(&company.industry);
    if industry.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "company {} has no industry",
            company.id
        )));
    }

    let dimension_ratios: BTreeMap<String, f64> = assessment
        .dimension_scores
        .iter()
        .map(|d| (normalize_tag(&d.dimension), ratio(d.score, d.max_score)))
        .filter(|(name, _)| !name.is_empty())
        .collect();

    let weak_dimensions: Vec<String> = dimension_ratios
        .iter()
        .filter(|(_, r)| **r < rules.weak_dimension_threshold)
        .map(|(name, _)| name.clone())
        .collect();

    let mut required_domains = normalize_tags(&company.focus_domains);
    if required_domains.is_empty() {
        required_domains = normalize_tags(&rules.default_domains);
    }

    let target_skills = derive_target_skills(&dimension_ratios, &weak_dimensions, rules);

    let mut labels = TagLabels::new();
    record_labels(&mut labels, [&company.industry]);
    record_labels(&mut labels, &company.sub_industries);
    record_labels(&mut labels, &company.focus_domains);
    record_labels(&mut labels, &rules.default_domains);
    record_labels(&mut labels, assessment.dimension_scores.iter().map(|d| &d.dimension));
    record_labels(&mut labels, rules.dimension_skill_tags.values().flatten());

    Ok(CompanyFeatures {
        industry,
        sub_industries: normalize_tags(&company.sub_industries),
        size,
        maturity: ratio(assessment.total_score, assessment.max_possible_score),
        dimension_ratios,
        weak_dimensions,
        required_domains,
        target_skills,
        generic_industry_tokens: normalize_tags(&rules.industry_generic_tokens),
        labels,
    })
}

/// Builds the candidate-side features. Rejects records with unknown teaching levels.
pub fn normalize_candidate(row: &ConsultantRow) -> Result<CandidateFeatures, AppError> {
    let teaching_levels = row
        .teaching_levels
        .iter()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            TeachingLevel::parse(raw).ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "consultant {} has unknown teaching level '{}'",
                    row.user_id, raw
                ))
            })
        })
        .collect::<Result<BTreeSet<_>, _>>()?;

    let sub_industries = row.sub_industries.as_deref().unwrap_or_default();
    let mut labels = TagLabels::new();
    for tags in [
        &row.expertise_domains,
        &row.available_industries,
        &row.coaching_methods,
        &row.skill_tags,
    ] {
        record_labels(&mut labels, tags);
    }
    record_labels(&mut labels, sub_industries);

    Ok(CandidateFeatures {
        user_id: row.user_id,
        name: row.name.trim().to_string(),
        expertise_domains: normalize_tags(&row.expertise_domains),
        available_industries: normalize_tags(&row.available_industries),
        sub_industries: normalize_tags(sub_industries),
        teaching_levels,
        coaching_methods: normalize_tags(&row.coaching_methods),
        skill_tags: normalize_tags(&row.skill_tags),
        years_of_experience: row.years_of_experience,
        labels,
    })
}

/// Skill tags mapped from weak dimensions; all assessed dimensions when none is weak.
fn derive_target_skills(
    dimension_ratios: &BTreeMap<String, f64>,
    weak_dimensions: &[String],
    rules: &MatchingRules,
) -> TagSet {
    let skill_map: BTreeMap<String, &Vec<String>> = rules
        .dimension_skill_tags
        .iter()
        .map(|(dimension, tags)| (normalize_tag(dimension), tags))
        .collect();

    let sources: Vec<&String> = if weak_dimensions.is_empty() {
        dimension_ratios.keys().collect()
    } else {
        weak_dimensions.iter().collect()
    };

    sources
        .into_iter()
        .filter_map(|dimension| skill_map.get(dimension))
        .flat_map(|tags| tags.iter().map(|t| normalize_tag(t)))
        .filter(|t| !t.is_empty())
        .collect()
}

fn validate_assessment(assessment: &SelfAssessmentRow) -> Result<(), AppError> {
    let invalid = |msg: String| Err(AppError::InvalidInput(msg));

    if !(assessment.max_possible_score > 0.0) {
        return invalid(format!(
            "self-assessment {} has non-positive max_possible_score",
            assessment.id
        ));
    }
    if !(0.0..=assessment.max_possible_score).contains(&assessment.total_score) {
        return invalid(format!(
            "self-assessment {} total_score {} outside [0, {}]",
            assessment.id, assessment.total_score, assessment.max_possible_score
        ));
    }
    for d in assessment.dimension_scores.iter() {
        if !(d.max_score > 0.0) || !(0.0..=d.max_score).contains(&d.score) {
            return invalid(format!(
                "self-assessment {} dimension '{}' score {} outside [0, {}]",
                assessment.id, d.dimension, d.score, d.max_score
            ));
        }
    }
    Ok(())
}

fn ratio(score: f64, max: f64) -> f64 {
    if max > 0.0 {
        (score / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Trims, collapses inner whitespace, and lower-cases a free-text tag.
pub fn normalize_tag(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn normalize_tags<I, S>(raw: I) -> TagSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|s| normalize_tag(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Keeps the first display spelling (trimmed, whitespace-collapsed) per normalized tag.
fn record_labels<I, S>(labels: &mut TagLabels, raw: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for raw in raw {
        let display = raw.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
        let key = display.to_lowercase();
        if !key.is_empty() {
            labels.entry(key).or_insert(display);
        }
    }
}

fn label_of<'a>(labels: &'a TagLabels, tag: &'a str) -> &'a str {
    labels.get(tag).map(String::as_str).unwrap_or(tag)
}

fn tag_tokens<'a>(tag: &'a str, generic: &TagSet) -> BTreeSet<&'a str> {
    tag.split(|c: char| c == '/' || c == ',' || c == '·' || c.is_whitespace())
        .filter(|t| !t.is_empty() && !generic.contains(*t))
        .collect()
}

/// Two normalized tags are related when equal or when they share a token that is
/// not in `generic` ("it/소프트웨어" and "소프트웨어 개발", but not "it 서비스" and
/// "금융 서비스").
pub fn tags_related(a: &str, b: &str, generic: &TagSet) -> bool {
    if a == b {
        return true;
    }
    let a_tokens = tag_tokens(a, generic);
    tag_tokens(b, generic).iter().any(|t| a_tokens.contains(t))
}
