use std::sync::Arc;

use crate::config::Config;
use crate::matching::engine::MatchingEngine;
use crate::matching::repository::{CompanyRepository, ConsultantRepository, RecommendationStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: Arc<MatchingEngine>,
    /// Read-only company + self-assessment source.
    pub companies: Arc<dyn CompanyRepository>,
    /// Read-only consultant pool.
    pub consultants: Arc<dyn ConsultantRepository>,
    pub recommendations: Arc<dyn RecommendationStore>,
}
