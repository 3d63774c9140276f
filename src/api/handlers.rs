//! HTTP request handlers

use super::error::ApiError;
use super::state::AppState;
use crate::models::ArtifactStatus;
use crate::types::catalog::{Meal, Workout, SAMPLE_MEALS, SAMPLE_WORKOUTS};
use crate::types::PredictionResult;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Map, Value};
use std::time::Instant;
use tracing::{error, info, warn};

/// Liveness/info endpoint
pub async fn index() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "FitLab backend running",
    }))
}

/// Which artifacts loaded at startup
pub async fn health(State(state): State<AppState>) -> Json<ArtifactStatus> {
    Json(state.artifacts.status())
}

/// Predict the workout type for a feature payload
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let start_time = Instant::now();

    match run_prediction(&state, body).await {
        Ok(result) => {
            let elapsed = start_time.elapsed();
            state
                .metrics
                .record_prediction(&result.predicted_label, elapsed);
            info!(
                prediction = %result.predicted_label,
                confidence = result.confidence,
                processing_time_us = elapsed.as_micros(),
                "Prediction served"
            );
            Ok(Json(result))
        }
        Err(e) => {
            state.metrics.record_failure(e.outcome());
            if e.status().is_client_error() {
                warn!(error = %e, "Rejected prediction request");
            } else {
                error!(error = %e, "Prediction failed");
            }
            Err(e)
        }
    }
}

async fn run_prediction(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
) -> Result<PredictionResult, ApiError> {
    // Checked before the payload is even read
    if !state.artifacts.status().all_loaded() {
        return Err(ApiError::ArtifactsUnavailable);
    }

    let payload = parse_payload(&body?)?;
    let features = state.extractor.extract(&payload)?;

    let artifacts = state.artifacts.clone();
    tokio::task::spawn_blocking(move || {
        let predictor = artifacts
            .predictor()
            .ok_or(ApiError::ArtifactsUnavailable)?;
        Ok::<_, ApiError>(predictor.predict(&features)?)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
}

fn parse_payload(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(payload)) => Ok(payload),
        Ok(_) => Err(ApiError::InvalidBody(
            "Request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(ApiError::InvalidBody(format!("Malformed JSON body: {e}"))),
    }
}

/// Sample workouts
pub async fn workouts() -> Json<Vec<Workout>> {
    Json(SAMPLE_WORKOUTS.to_vec())
}

/// Sample meals
pub async fn meals() -> Json<Vec<Meal>> {
    Json(SAMPLE_MEALS.to_vec())
}

pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}
