//! Criterion Scorers: five fixed, weighted, pure scoring functions.
//!
//! Every scorer clamps into `[0, max_score]` and returns an explanation. A "no match"
//! is a zero score, never an error; only malformed input (negative experience) fails.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::normalizer::{normalize_tags, FeatureSet, TagSet};
use crate::matching::rules::MatchingRules;
use crate::models::company::CompanySize;
use crate::models::consultant::TeachingLevel;
use crate::models::recommendation::ScoreBreakdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Industry,
    Expertise,
    Skill,
    Experience,
    Availability,
}

impl Criterion {
    /// Fixed evaluation order. Also the tie-break order when highlights are selected.
    pub const ALL: [Criterion; 5] = [
        Criterion::Industry,
        Criterion::Expertise,
        Criterion::Skill,
        Criterion::Experience,
        Criterion::Availability,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Criterion::Industry => "산업 적합도",
            Criterion::Expertise => "전문 분야 적합도",
            Criterion::Skill => "스킬 적합도",
            Criterion::Experience => "경력 적합도",
            Criterion::Availability => "교육 방식 적합도",
        }
    }

    pub fn max_score(self, rules: &MatchingRules) -> f64 {
        let w = &rules.weights;
        match self {
            Criterion::Industry => w.industry,
            Criterion::Expertise => w.expertise,
            Criterion::Skill => w.skill,
            Criterion::Experience => w.experience,
            Criterion::Availability => w.availability,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriterionScore {
    pub criterion: Criterion,
    pub score: f64,
    pub max_score: f64,
    pub explanation: String,
}

impl CriterionScore {
    /// Builds a score, clamping into `[0, max_score]`. Non-finite values become 0.
    fn new(criterion: Criterion, score: f64, max_score: f64, explanation: String) -> Self {
        let max_score = if max_score.is_finite() { max_score.max(0.0) } else { 0.0 };
        let score = if score.is_finite() {
            score.clamp(0.0, max_score)
        } else {
            0.0
        };
        Self {
            criterion,
            score,
            max_score,
            explanation,
        }
    }

    /// score / max_score; 0 for a zero-weight criterion.
    pub fn ratio(&self) -> f64 {
        if self.max_score > 0.0 {
            self.score / self.max_score
        } else {
            0.0
        }
    }

    pub fn to_breakdown(&self) -> ScoreBreakdown {
        ScoreBreakdown {
            criteria: self.criterion.label().to_string(),
            score: self.score,
            max_score: self.max_score,
            explanation: self.explanation.clone(),
        }
    }
}

/// Runs every criterion in `Criterion::ALL` order.
pub fn score_all(
    features: &FeatureSet<'_>,
    rules: &MatchingRules,
) -> Result<Vec<CriterionScore>, AppError> {
    Criterion::ALL
        .iter()
        .map(|criterion| match criterion {
            Criterion::Industry => Ok(score_industry(features, rules)),
            Criterion::Expertise => Ok(score_expertise(features, rules)),
            Criterion::Skill => Ok(score_skills(features, rules)),
            Criterion::Experience => score_experience(features, rules),
            Criterion::Availability => Ok(score_availability(features, rules)),
        })
        .collect()
}

pub fn score_industry(features: &FeatureSet<'_>, rules: &MatchingRules) -> CriterionScore {
    let max = Criterion::Industry.max_score(rules);
    let company = features.company;
    let candidate = &features.candidate;
    let related = &features.related_industries;
    let industry = company.label(&company.industry);

    if features.industry_match {
        let mut explanation = format!("'{industry}' 산업 컨설팅 가능");
        let extra: Vec<&str> = related
            .iter()
            .filter(|t| **t != company.industry)
            .map(|t| candidate.label(t))
            .collect();
        if !extra.is_empty() {
            explanation.push_str(&format!(", 관련 산업({}) 경험 보유", join(extra)));
        }
        return CriterionScore::new(Criterion::Industry, max, max, explanation);
    }

    if related.is_empty() {
        let available = join(
            candidate
                .available_industries
                .iter()
                .map(|t| candidate.label(t)),
        );
        return CriterionScore::new(
            Criterion::Industry,
            0.0,
            max,
            format!(
                "'{industry}' 산업 및 관련 산업 경험 없음 (가능 산업: {available})"
            ),
        );
    }

    let fraction = (related.len() as f64 * rules.industry_partial_per_overlap)
        .min(rules.industry_partial_cap);
    CriterionScore::new(
        Criterion::Industry,
        max * fraction,
        max,
        format!(
            "'{industry}' 산업과 직접 일치하지 않으나 관련 산업({}) 경험 보유",
            join(related.iter().map(|t| candidate.label(t)))
        ),
    )
}

pub fn score_expertise(features: &FeatureSet<'_>, rules: &MatchingRules) -> CriterionScore {
    let max = Criterion::Expertise.max_score(rules);
    let company = features.company;
    let required = &company.required_domains;

    if required.is_empty() {
        return CriterionScore::new(
            Criterion::Expertise,
            0.0,
            max,
            "요구 전문 분야가 정의되지 않음".to_string(),
        );
    }

    let matched: Vec<&String> = required
        .intersection(&features.candidate.expertise_domains)
        .collect();
    let score = max * matched.len() as f64 / required.len() as f64;

    let explanation = if matched.is_empty() {
        format!(
            "요구 전문 분야({}) 중 일치 항목 없음",
            join(required.iter().map(|t| company.label(t)))
        )
    } else {
        format!(
            "요구 전문 분야 {}개 중 {}개 일치 ({})",
            required.len(),
            matched.len(),
            join(matched.into_iter().map(|t| company.label(t)))
        )
    };
    CriterionScore::new(Criterion::Expertise, score, max, explanation)
}

pub fn score_skills(features: &FeatureSet<'_>, rules: &MatchingRules) -> CriterionScore {
    let max = Criterion::Skill.max_score(rules);
    let target = &features.company.target_skills;
    let skills = &features.candidate.skill_tags;

    if target.is_empty() {
        return CriterionScore::new(
            Criterion::Skill,
            0.0,
            max,
            "자가진단 결과에서 도출된 목표 스킬 없음".to_string(),
        );
    }

    let overlap: Vec<&String> = target.intersection(skills).collect();
    let union = target.union(skills).count();
    let jaccard = overlap.len() as f64 / union as f64;

    let company = features.company;
    let candidate = &features.candidate;
    let focus = if company.weak_dimensions.is_empty() {
        "전체 진단 영역".to_string()
    } else {
        format!(
            "취약 영역({})",
            join(company.weak_dimensions.iter().map(|d| company.label(d)))
        )
    };
    let explanation = if overlap.is_empty() {
        format!("{focus} 관련 스킬 보유 없음")
    } else {
        format!(
            "{focus} 관련 스킬 {}개 보유 ({})",
            overlap.len(),
            join(overlap.iter().map(|t| candidate.label(t)))
        )
    };
    CriterionScore::new(Criterion::Skill, max * jaccard, max, explanation)
}

pub fn score_experience(
    features: &FeatureSet<'_>,
    rules: &MatchingRules,
) -> Result<CriterionScore, AppError> {
    let max = Criterion::Experience.max_score(rules);
    let years = features.candidate.years_of_experience;
    if years < 0 {
        return Err(AppError::InvalidInput(format!(
            "consultant {} has negative years_of_experience ({years})",
            features.candidate.user_id
        )));
    }

    let saturation = rules.experience_saturation_years.max(1);
    let capped = (years as u32).min(saturation);
    let score = max * capped as f64 / saturation as f64;

    let explanation = if years as u32 >= saturation {
        format!("경력 {years}년 (기준 {saturation}년 이상 충족)")
    } else {
        format!("경력 {years}년 (기준 {saturation}년)")
    };
    Ok(CriterionScore::new(Criterion::Experience, score, max, explanation))
}

pub fn score_availability(features: &FeatureSet<'_>, rules: &MatchingRules) -> CriterionScore {
    let max = Criterion::Availability.max_score(rules);
    let company = features.company;
    let candidate = &features.candidate;
    let tier = tier_level(company.maturity);

    let levels = &candidate.teaching_levels;
    let leader_fit = company.size == CompanySize::Large && levels.contains(&TeachingLevel::Leader);
    let (level_part, level_note) = if levels.contains(&tier) || leader_fit {
        (1.0, format!("{tier:?} 수준 교육 가능"))
    } else if levels.iter().any(|l| l.is_adjacent(tier)) {
        (0.5, format!("{tier:?} 인접 수준 교육 가능"))
    } else {
        (0.0, format!("{tier:?} 수준 교육 불가"))
    };

    let preferred: TagSet = rules
        .size_coaching_methods
        .get(&company.size)
        .map(normalize_tags)
        .unwrap_or_default();
    let matched_methods: Vec<&String> = preferred.intersection(&candidate.coaching_methods).collect();
    let (method_part, method_note) = if preferred.is_empty() {
        (1.0, "선호 코칭 방식 제약 없음".to_string())
    } else if matched_methods.is_empty() {
        (0.0, "기업 규모에 맞는 코칭 방식 없음".to_string())
    } else {
        (
            1.0,
            format!(
                "코칭 방식 일치 ({})",
                join(matched_methods.into_iter().map(|t| candidate.label(t)))
            ),
        )
    };

    let share = rules.teaching_level_share;
    let score = max * (share * level_part + (1.0 - share) * method_part);
    CriterionScore::new(
        Criterion::Availability,
        score,
        max,
        format!("{level_note}, {method_note}"),
    )
}

/// Expected teaching level for a company's self-assessed maturity.
pub fn tier_level(maturity: f64) -> TeachingLevel {
    if maturity < 0.4 {
        TeachingLevel::Beginner
    } else if maturity < 0.7 {
        TeachingLevel::Intermediate
    } else {
        TeachingLevel::Advanced
    }
}

fn join<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::normalizer::{
        normalize_candidate, normalize_company, CandidateFeatures, CompanyFeatures, TagLabels,
    };
    use crate::matching::memory;
    use std::collections::{BTreeMap, BTreeSet};
    use uuid::Uuid;

    fn company_features() -> CompanyFeatures {
        CompanyFeatures {
            industry: "제조업".to_string(),
            sub_industries: TagSet::new(),
            size: CompanySize::Medium,
            dimension_ratios: BTreeMap::from([("데이터".to_string(), 0.3)]),
            maturity: 0.5,
            weak_dimensions: vec!["데이터".to_string()],
            required_domains: normalize_tags(["데이터 분석", "업무 자동화"]),
            target_skills: normalize_tags(["데이터 분석", "데이터 거버넌스"]),
            generic_industry_tokens: normalize_tags(&MatchingRules::default().industry_generic_tokens),
            labels: TagLabels::new(),
        }
    }

    fn candidate() -> CandidateFeatures {
        CandidateFeatures {
            user_id: Uuid::new_v4(),
            name: "이컨설".to_string(),
            expertise_domains: normalize_tags(["데이터 분석"]),
            available_industries: normalize_tags(["제조업"]),
            sub_industries: TagSet::new(),
            teaching_levels: BTreeSet::from([TeachingLevel::Intermediate]),
            coaching_methods: normalize_tags(["실습 워크숍"]),
            skill_tags: normalize_tags(["데이터 분석"]),
            years_of_experience: 5,
            labels: TagLabels::new(),
        }
    }

    #[test]
    fn test_exact_industry_match_scores_full() {
        let company = company_features();
        let fs = FeatureSet::new(&company, candidate());
        let s = score_industry(&fs, &MatchingRules::default());
        assert_eq!(s.score, 30.0);
        assert!(s.explanation.contains("제조업"));
    }

    #[test]
    fn test_partial_industry_overlap_is_strictly_between() {
        let mut company = company_features();
        company.industry = "it/소프트웨어".to_string();
        let mut c = candidate();
        c.sub_industries = normalize_tags(["소프트웨어 개발"]);
        let fs = FeatureSet::new(&company, c);

        let s = score_industry(&fs, &MatchingRules::default());
        assert!(s.score > 0.0 && s.score < s.max_score, "got {}", s.score);
        assert!((s.score - 7.5).abs() < 1e-9);
        assert!(s.explanation.contains("소프트웨어"));
    }

    #[test]
    fn test_partial_industry_bonus_is_capped_below_max() {
        let mut company = company_features();
        company.industry = "it/소프트웨어".to_string();
        company.sub_industries = normalize_tags(["클라우드 서비스", "보안 솔루션", "게임 개발", "모바일 앱"]);
        let mut c = candidate();
        c.sub_industries = normalize_tags(["소프트웨어", "클라우드", "보안", "게임", "모바일"]);
        let fs = FeatureSet::new(&company, c);

        let s = score_industry(&fs, &MatchingRules::default());
        assert!((s.score - 24.0).abs() < 1e-9, "got {}", s.score);
    }

    #[test]
    fn test_shared_generic_token_earns_no_industry_credit() {
        let mut company = company_features();
        company.industry = "it 서비스".to_string();
        let mut c = candidate();
        c.available_industries = normalize_tags(["금융 서비스"]);
        let fs = FeatureSet::new(&company, c);

        let s = score_industry(&fs, &MatchingRules::default());
        assert_eq!(s.score, 0.0);
        assert!(!s.explanation.contains("경험 보유"));
    }

    #[test]
    fn test_partial_industry_explanation_cites_candidate_tag() {
        let rules = MatchingRules::default();
        let company_row = memory::company();
        let company =
            normalize_company(&company_row, Some(&memory::perfect_assessment(company_row.id)), &rules)
                .unwrap();
        let fs = FeatureSet::new(&company, normalize_candidate(&memory::consultant(1)).unwrap());

        let s = score_industry(&fs, &rules);
        assert!((s.score - 7.5).abs() < 1e-9, "got {}", s.score);
        assert!(s.explanation.contains("관련 산업(자동차 정비)"), "{}", s.explanation);
        assert!(!s.explanation.contains("자동차 부품"));
    }

    #[test]
    fn test_explanations_use_original_spelling() {
        let rules = MatchingRules::default();
        let mut company_row = memory::company();
        company_row.industry = "IT/소프트웨어".to_string();
        let company =
            normalize_company(&company_row, Some(&memory::perfect_assessment(company_row.id)), &rules)
                .unwrap();
        let mut row = memory::consultant(1);
        row.available_industries = vec!["IT/소프트웨어".to_string()];
        row.skill_tags = vec!["AI 전략".to_string(), "Python".to_string()];
        let fs = FeatureSet::new(&company, normalize_candidate(&row).unwrap());

        let industry = score_industry(&fs, &rules);
        assert!(industry.explanation.contains("'IT/소프트웨어'"), "{}", industry.explanation);
        let skills = score_skills(&fs, &rules);
        assert!(skills.explanation.contains("AI 전략"), "{}", skills.explanation);
        assert!(!skills.explanation.contains("ai 전략"));
    }

    #[test]
    fn test_no_industry_overlap_scores_zero_with_reason() {
        let mut company = company_features();
        company.industry = "금융".to_string();
        let fs = FeatureSet::new(&company, candidate());
        let s = score_industry(&fs, &MatchingRules::default());
        assert_eq!(s.score, 0.0);
        assert!(s.explanation.contains("금융"));
    }

    #[test]
    fn test_expertise_is_proportional_to_required_coverage() {
        let company = company_features();
        let fs = FeatureSet::new(&company, candidate());
        let s = score_expertise(&fs, &MatchingRules::default());
        assert!((s.score - 12.5).abs() < 1e-9);
        assert!(s.explanation.contains("2개 중 1개"));
    }

    #[test]
    fn test_skill_score_is_jaccard_scaled() {
        let company = company_features();
        let mut c = candidate();
        c.skill_tags = normalize_tags(["데이터 분석", "엑셀"]);
        let fs = FeatureSet::new(&company, c);
        // |{데이터 분석}| / |{데이터 분석, 데이터 거버넌스, 엑셀}| = 1/3
        let s = score_skills(&fs, &MatchingRules::default());
        assert!((s.score - 20.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_skill_with_empty_target_scores_zero() {
        let mut company = company_features();
        company.target_skills.clear();
        let fs = FeatureSet::new(&company, candidate());
        assert_eq!(score_skills(&fs, &MatchingRules::default()).score, 0.0);
    }

    #[test]
    fn test_experience_saturates_without_penalty() {
        let company = company_features();
        let rules = MatchingRules::default();
        let mut scores = Vec::new();
        for years in [0, 3, 10, 25] {
            let mut c = candidate();
            c.years_of_experience = years;
            let fs = FeatureSet::new(&company, c);
            scores.push(score_experience(&fs, &rules).unwrap().score);
        }
        assert_eq!(scores[0], 0.0);
        assert!((scores[1] - 4.5).abs() < 1e-9);
        assert_eq!(scores[2], 15.0);
        assert_eq!(scores[3], 15.0);
    }

    #[test]
    fn test_negative_experience_is_invalid_input() {
        let company = company_features();
        let mut c = candidate();
        c.years_of_experience = -1;
        let fs = FeatureSet::new(&company, c);
        assert!(matches!(
            score_experience(&fs, &MatchingRules::default()),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_availability_full_when_tier_and_method_match() {
        let company = company_features(); // maturity 0.5 → INTERMEDIATE, medium → workshop
        let fs = FeatureSet::new(&company, candidate());
        let s = score_availability(&fs, &MatchingRules::default());
        assert!((s.score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_availability_adjacent_level_without_method() {
        let company = company_features();
        let mut c = candidate();
        c.teaching_levels = BTreeSet::from([TeachingLevel::Advanced]);
        c.coaching_methods.clear();
        let fs = FeatureSet::new(&company, c);
        // 10 × (0.7 × 0.5 + 0.3 × 0)
        let s = score_availability(&fs, &MatchingRules::default());
        assert!((s.score - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_leader_level_counts_for_large_companies() {
        let mut company = company_features();
        company.size = CompanySize::Large;
        company.maturity = 0.2;
        let mut c = candidate();
        c.teaching_levels = BTreeSet::from([TeachingLevel::Leader]);
        c.coaching_methods = normalize_tags(["그룹 강의"]);
        let fs = FeatureSet::new(&company, c);
        let s = score_availability(&fs, &MatchingRules::default());
        assert!((s.score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_weight_criterion_stays_zero() {
        let mut rules = MatchingRules::default();
        rules.weights.industry = 0.0;
        let company = company_features();
        let fs = FeatureSet::new(&company, candidate());
        let s = score_industry(&fs, &rules);
        assert_eq!(s.score, 0.0);
        assert_eq!(s.ratio(), 0.0);
    }

    #[test]
    fn test_every_score_within_bounds() {
        let company = company_features();
        let rules = MatchingRules::default();
        let fs = FeatureSet::new(&company, candidate());
        for s in score_all(&fs, &rules).unwrap() {
            assert!(s.score >= 0.0 && s.score <= s.max_score, "{:?}", s);
        }
    }

    #[test]
    fn test_tier_levels() {
        assert_eq!(tier_level(0.1), TeachingLevel::Beginner);
        assert_eq!(tier_level(0.4), TeachingLevel::Intermediate);
        assert_eq!(tier_level(0.95), TeachingLevel::Advanced);
    }

    #[test]
    fn test_score_all_follows_fixed_criterion_order() {
        let rules = MatchingRules::default();
        let company = company_features();
        let fs = FeatureSet::new(&company, candidate());
        let order: Vec<Criterion> = score_all(&fs, &rules)
            .unwrap()
            .iter()
            .map(|s| s.criterion)
            .collect();
        assert_eq!(order, Criterion::ALL.to_vec());
    }
}
