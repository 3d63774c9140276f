//! Mapping of request failures onto HTTP responses

use crate::error::{FieldError, PredictError};
use crate::metrics::Outcome;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Why a `/predict` call failed
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Model/scaler/encoder not loaded. See backend logs.")]
    ArtifactsUnavailable,

    #[error(transparent)]
    InvalidField(#[from] FieldError),

    #[error("{0}")]
    InvalidBody(String),

    /// The body could not be read, e.g. it exceeds the configured limit
    #[error("{}", .0.body_text())]
    BodyRejected(#[from] BytesRejection),

    #[error(transparent)]
    Prediction(#[from] PredictError),

    /// The blocking inference task died
    #[error("Prediction error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidField(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::BodyRejected(rejection) => rejection.status(),
            ApiError::ArtifactsUnavailable | ApiError::Prediction(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.status().is_client_error() {
            Outcome::ClientError
        } else {
            Outcome::ServerError
        }
    }

    /// Message returned in the `error` field of the response body
    pub fn message(&self) -> String {
        match self {
            ApiError::Prediction(PredictError::DimensionMismatch { expected, actual }) => format!(
                "Scaler dimension mismatch. The loaded scaler expects {expected} features but \
                 {actual} were provided. Regenerate the scaler for the current feature schema \
                 by running fit-scaler to produce top20_scaler.json."
            ),
            ApiError::Prediction(e) => format!("Prediction error: {e}"),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}
