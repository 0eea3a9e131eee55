//! Rationale Composer: one human-readable summary per ranked candidate.
//!
//! Which criteria get mentioned is decided here, deterministically. An injected
//! `TextGenerator` may reword those facts; any failure, timeout, or empty reply
//! falls back to the templated sentence, so rationale never fails a run.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::llm_client::prompts::{FACTS_ONLY_INSTRUCTION, PLAIN_PROSE_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::matching::criteria::CriterionScore;
use crate::matching::prompts::RATIONALE_PROMPT_TEMPLATE;
use crate::matching::ranker::ScoredCandidate;
use crate::matching::rules::TOTAL_POINTS;

const MAX_HIGHLIGHTS: usize = 3;

/// Prompt in, prose out. Implementations may be slow or fail; callers bound them.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.call_text(prompt, system).await
    }
}

#[derive(Clone)]
pub struct RationaleComposer {
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl RationaleComposer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Templated rationale only; no external calls.
    #[cfg(test)]
    pub fn templated() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub async fn compose(&self, candidate: &ScoredCandidate) -> String {
        let highlights = select_highlights(&candidate.scores);
        let fallback = templated_rationale(candidate, &highlights);

        let Some(generator) = &self.generator else {
            return fallback;
        };
        if highlights.is_empty() {
            return fallback;
        }

        let prompt = build_rationale_prompt(candidate, &highlights);
        let outcome = tokio::time::timeout(
            self.timeout,
            generator.generate(&prompt, PLAIN_PROSE_SYSTEM),
        )
        .await
        .unwrap_or_else(|_| Err(LlmError::Timeout(self.timeout.as_millis() as u64)));

        match outcome {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(
                    "Rationale wording for {} came back empty, using template",
                    candidate.user_id
                );
                fallback
            }
            Err(e) => {
                warn!(
                    "Rationale wording for {} failed ({e}), using template",
                    candidate.user_id
                );
                fallback
            }
        }
    }
}

/// Up to three best criteria by score/max ratio, zero scores skipped.
/// Equal ratios keep the fixed criterion order.
pub fn select_highlights(scores: &[CriterionScore]) -> Vec<&CriterionScore> {
    let mut ranked: Vec<&CriterionScore> = scores.iter().filter(|s| s.score > 0.0).collect();
    ranked.sort_by(|a, b| {
        b.ratio()
            .partial_cmp(&a.ratio())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.criterion.cmp(&b.criterion))
    });
    ranked.truncate(MAX_HIGHLIGHTS);
    ranked
}

/// "{name} 컨설턴트 (총점 82.5/100): 산업 적합도 30.0/30, ... 항목에서 강점을 보입니다. {top explanation}."
pub fn templated_rationale(candidate: &ScoredCandidate, highlights: &[&CriterionScore]) -> String {
    let head = format!(
        "{} 컨설턴트 (총점 {:.1}/{TOTAL_POINTS:.0})",
        candidate.name, candidate.total_score
    );

    let Some(top) = highlights.first() else {
        return format!("{head}: 두드러진 적합 항목이 없습니다.");
    };

    let items = highlights
        .iter()
        .map(|s| format!("{} {:.1}/{:.0}", s.criterion.label(), s.score, s.max_score))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{head}: {items} 항목에서 강점을 보입니다. {}.", top.explanation)
}

fn build_rationale_prompt(candidate: &ScoredCandidate, highlights: &[&CriterionScore]) -> String {
    let highlights = highlights
        .iter()
        .map(|s| {
            format!(
                "- {} ({:.1}/{:.0}): {}",
                s.criterion.label(),
                s.score,
                s.max_score,
                s.explanation
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    RATIONALE_PROMPT_TEMPLATE
        .replace("{facts_only_instruction}", FACTS_ONLY_INSTRUCTION)
        .replace("{consultant_name}", &candidate.name)
        .replace("{total_score}", &format!("{:.1}", candidate.total_score))
        .replace("{highlights}", &highlights)
}
