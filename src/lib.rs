//! FitLab Workout Inference Library
//!
//! Serves a pre-trained workout-type classifier: payloads of 20 named
//! features are validated, standardized and classified, and the predicted
//! workout type is returned with per-class probabilities.

pub mod api;
pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod scaler_fit;
pub mod types;

pub use config::AppConfig;
pub use error::{FieldError, PredictError};
pub use feature_extractor::{FeatureExtractor, FEATURE_SCHEMA};
pub use models::{ArtifactLoader, Artifacts, Predictor};
pub use types::PredictionResult;
