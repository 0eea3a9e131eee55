//! Aggregator & Ranker: totals criterion scores and produces the top-N ordering.
//!
//! Ordering is total score desc, then industry sub-score desc, then user id asc.
//! Insertion order never decides a tie, so unchanged inputs rank identically.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::matching::criteria::{Criterion, CriterionScore};

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub user_id: Uuid,
    pub name: String,
    pub scores: Vec<CriterionScore>,
    pub total_score: f64,
}

impl ScoredCandidate {
    /// `total_score` is the plain sum; criteria are pre-weighted through their maxima.
    pub fn new(user_id: Uuid, name: String, scores: Vec<CriterionScore>) -> Self {
        let total_score = scores.iter().map(|s| s.score).sum();
        Self {
            user_id,
            name,
            scores,
            total_score,
        }
    }

    pub fn criterion_score(&self, criterion: Criterion) -> f64 {
        self.scores
            .iter()
            .find(|s| s.criterion == criterion)
            .map(|s| s.score)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct RankedCandidate {
    /// 1-based, contiguous within a batch.
    pub rank: u32,
    pub candidate: ScoredCandidate,
}

fn compare(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| {
            b.criterion_score(Criterion::Industry)
                .total_cmp(&a.criterion_score(Criterion::Industry))
        })
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Sorts, keeps the first `top_n`, and assigns ranks 1..=K.
/// Fewer candidates than `top_n` are all returned; none yields an empty list.
pub fn rank(mut candidates: Vec<ScoredCandidate>, top_n: usize) -> Vec<RankedCandidate> {
    candidates.sort_by(compare);
    candidates.truncate(top_n);

    candidates
        .into_iter()
        .zip(1u32..)
        .map(|(candidate, rank)| RankedCandidate { rank, candidate })
        .collect()
}
