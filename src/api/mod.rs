//! HTTP surface of the inference service

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use crate::config::ServerConfig;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the router with all endpoints and middleware
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .route("/workouts", get(handlers::workouts))
        .route("/meals", get(handlers::meals))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(TraceLayer::new_for_http());

    if server.cors_allow_any_origin {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::{FEATURE_COUNT, FEATURE_SCHEMA};
    use crate::metrics::ServiceMetrics;
    use crate::models::{Artifacts, LabelEncoder, LinearClassifier, StandardScaler};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tower::ServiceExt;

    const CLASSES: [&str; 4] = ["Cardio", "HIIT", "Strength", "Yoga"];

    fn model() -> LinearClassifier {
        let coefficients = (0..CLASSES.len())
            .map(|k| {
                (0..FEATURE_COUNT)
                    .map(|i| ((i * 7 + k * 3) % 11) as f64 / 10.0 - 0.5)
                    .collect()
            })
            .collect();
        LinearClassifier::new(coefficients, vec![0.2, -0.1, 0.0, 0.1]).unwrap()
    }

    fn scaler(n: usize) -> StandardScaler {
        let mean = (0..n).map(|i| i as f64 * 10.0).collect();
        let scale = (0..n).map(|i| 1.0 + i as f64).collect();
        StandardScaler::new(mean, scale).unwrap()
    }

    fn encoder() -> LabelEncoder {
        LabelEncoder::new(CLASSES.iter().map(|c| c.to_string()).collect()).unwrap()
    }

    fn loaded() -> Artifacts {
        Artifacts {
            model: Some(Box::new(model())),
            scaler: Some(scaler(FEATURE_COUNT)),
            label_encoder: Some(encoder()),
        }
    }

    fn app_with(artifacts: Artifacts) -> (Router, Arc<ServiceMetrics>) {
        let metrics = Arc::new(ServiceMetrics::new());
        let state = AppState::new(artifacts, metrics.clone());
        (router(state, &ServerConfig::default()), metrics)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_predict(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    fn full_payload() -> Value {
        let values = [
            300.0, -200.0, 1.25, 320.0, 2.0, 72.5, 2100.0, 4.0, 58.3, 2.7, 24.1, 24.3, 1.6,
            180.0, 175.0, 25.0, 80.0, 900.0, 22.0, 350.0,
        ];
        let map: serde_json::Map<String, Value> = FEATURE_SCHEMA
            .iter()
            .zip(values)
            .map(|(name, v)| (name.to_string(), json!(v)))
            .collect();
        Value::Object(map)
    }

    fn assert_well_formed(body: &Value) {
        let prediction = body["prediction"].as_str().unwrap();
        assert!(CLASSES.contains(&prediction));

        let probabilities = body["probabilities"].as_object().unwrap();
        assert_eq!(probabilities.len(), CLASSES.len());
        for class in CLASSES {
            assert!(probabilities.contains_key(class));
        }

        let values: Vec<f64> = probabilities.values().map(|v| v.as_f64().unwrap()).collect();
        let total: f64 = values.iter().sum();
        assert!((total - 100.0).abs() < 1e-6);

        let confidence = body["confidence"].as_f64().unwrap();
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        assert_eq!(confidence, max);
        assert_eq!(probabilities[prediction].as_f64().unwrap(), confidence);
    }

    #[tokio::test]
    async fn test_index() {
        let (app, _) = app_with(loaded());
        let (status, body) = get_json(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_health_reports_each_artifact() {
        let (app, _) = app_with(Artifacts {
            model: Some(Box::new(model())),
            scaler: None,
            label_encoder: Some(encoder()),
        });
        let (status, body) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "model_loaded": true,
                "scaler_loaded": false,
                "label_encoder_loaded": true,
            })
        );
    }

    #[tokio::test]
    async fn test_predict_full_payload() {
        let (app, metrics) = app_with(loaded());
        let (status, body) = post_predict(app, &full_payload().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_well_formed(&body);
        assert_eq!(metrics.predictions_ok.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_predict_empty_payload() {
        let (app, _) = app_with(loaded());
        let (status, body) = post_predict(app, "{}").await;

        assert_eq!(status, StatusCode::OK);
        assert_well_formed(&body);
    }

    #[tokio::test]
    async fn test_missing_fields_match_explicit_zero() {
        let mut explicit = full_payload();
        explicit["BMI"] = json!(0);
        let mut missing = full_payload();
        missing.as_object_mut().unwrap().remove("BMI");

        let (_, a) = post_predict(app_with(loaded()).0, &explicit.to_string()).await;
        let (_, b) = post_predict(app_with(loaded()).0, &missing.to_string()).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_predict_invalid_field() {
        let (app, metrics) = app_with(loaded());
        let mut payload = full_payload();
        payload["BMI"] = json!("not-a-number");

        let (status, body) = post_predict(app, &payload.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid value for BMI" }));
        assert_eq!(metrics.client_errors.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_predict_rejects_non_object_body() {
        for body in ["[1, 2, 3]", "not json", "null"] {
            let (app, _) = app_with(loaded());
            let (status, response) = post_predict(app, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(response["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_predict_without_artifacts_skips_extraction() {
        let unavailable = [
            Artifacts::default(),
            Artifacts {
                model: None,
                ..loaded()
            },
            Artifacts {
                label_encoder: None,
                ..loaded()
            },
        ];

        for artifacts in unavailable {
            let (app, metrics) = app_with(artifacts);
            // An invalid field would be a 400 if extraction ran
            let (status, body) = post_predict(app, r#"{"BMI": "not-a-number"}"#).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(body["error"].as_str().unwrap().contains("not loaded"));
            assert_eq!(metrics.server_errors.load(Ordering::Relaxed), 1);
        }
    }

    #[tokio::test]
    async fn test_predict_scaler_dimension_mismatch() {
        let (app, _) = app_with(Artifacts {
            scaler: Some(scaler(45)),
            ..loaded()
        });
        let (status, body) = post_predict(app, &full_payload().to_string()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("Regenerate the scaler"));
    }

    #[tokio::test]
    async fn test_predict_other_failure_is_generic() {
        let (app, _) = app_with(Artifacts {
            label_encoder: Some(LabelEncoder::new(vec!["Cardio".into(), "Yoga".into()]).unwrap()),
            ..loaded()
        });
        let (status, body) = post_predict(app, "{}").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Prediction error:"));
        assert!(!message.contains("Regenerate"));
    }

    #[tokio::test]
    async fn test_predict_binary_overflow_is_a_server_error() {
        let mut row = vec![0.0; FEATURE_COUNT];
        row[0] = 2.0;
        row[1] = 2.0;
        let (app, metrics) = app_with(Artifacts {
            model: Some(Box::new(LinearClassifier::new(vec![row], vec![0.0]).unwrap())),
            scaler: Some(
                StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]).unwrap(),
            ),
            label_encoder: Some(LabelEncoder::new(vec!["Cardio".into(), "Yoga".into()]).unwrap()),
        });

        let payload = json!({ "Calories_Burned": 1e308, "cal_balance": -1e308 });
        let (status, body) = post_predict(app, &payload.to_string()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("Prediction error:"));
        assert!(body.get("probabilities").is_none());
        assert_eq!(metrics.server_errors.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_oversized_body_gets_json_error() {
        let metrics = Arc::new(ServiceMetrics::new());
        let server = ServerConfig {
            body_limit_bytes: 64,
            ..ServerConfig::default()
        };
        let app = router(AppState::new(loaded(), metrics.clone()), &server);

        let (status, body) = post_predict(app, &full_payload().to_string()).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["error"].is_string());
        assert_eq!(metrics.client_errors.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_catalog_endpoints() {
        let (status, workouts) = get_json(app_with(loaded()).0, "/workouts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(workouts.as_array().unwrap().len(), 2);
        assert_eq!(workouts[1]["name"], "HIIT Advanced");

        let (status, meals) = get_json(app_with(loaded()).0, "/meals").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(meals[0]["calories"], 400);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = get_json(app_with(loaded()).0, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let (app, _) = app_with(loaded());
        let request = Request::get("/health")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
