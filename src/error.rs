//! Typed errors for feature extraction and prediction

use thiserror::Error;

/// A payload value that could not be coerced to a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value for {field}")]
pub struct FieldError {
    /// Schema name of the offending feature
    pub field: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

/// Failures raised by the standard scaler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScalerError {
    #[error("scaler was fitted on {expected} features but received {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("feature {index} scaled to a non-finite value")]
    NonFinite { index: usize },
}

/// Failures raised by a classifier backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model expects {expected} features but received {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("model produced no class probabilities")]
    EmptyOutput,

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Failures raised by the label encoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderError {
    #[error("class index {index} is outside the {classes} known classes")]
    UnknownClass { index: usize, classes: usize },
}

/// Everything that can go wrong between a feature vector and a prediction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// The scaler and the feature schema disagree on dimensionality.
    #[error("scaler expects {expected} features but {actual} were provided")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("scaling failed: {0}")]
    ScalingFailed(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Encoder(#[from] EncoderError),

    #[error("model returned {model} class probabilities but the label encoder knows {encoder} classes")]
    ClassCountMismatch { model: usize, encoder: usize },

    /// The model returned something that is not a probability distribution.
    #[error("model returned an invalid probability distribution: {0}")]
    InvalidProbabilities(String),

    #[error("model predicted class {class} but class {most_probable} is more probable")]
    LabelDisagreement { class: usize, most_probable: usize },
}

impl From<ScalerError> for PredictError {
    fn from(err: ScalerError) -> Self {
        match err {
            ScalerError::DimensionMismatch { expected, actual } => {
                PredictError::DimensionMismatch { expected, actual }
            }
            other => PredictError::ScalingFailed(other.to_string()),
        }
    }
}
