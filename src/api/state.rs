//! Shared handler state

use crate::feature_extractor::FeatureExtractor;
use crate::metrics::ServiceMetrics;
use crate::models::Artifacts;
use std::sync::Arc;

/// Application state shared across handlers.
///
/// Everything here is read-only after startup apart from the atomic metrics.
#[derive(Clone)]
pub struct AppState {
    pub artifacts: Arc<Artifacts>,
    pub extractor: FeatureExtractor,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(artifacts: Artifacts, metrics: Arc<ServiceMetrics>) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
            extractor: FeatureExtractor::new(),
            metrics,
        }
    }
}
