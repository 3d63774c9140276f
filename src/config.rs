//! Configuration management for the inference service

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Answer CORS preflights for any origin, method and header
    pub cors_allow_any_origin: bool,
    /// Largest accepted request body
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_allow_any_origin: true,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

/// Model artifact locations, relative to `base_dir`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Directory containing the exported artifacts
    pub base_dir: String,
    /// Classifier (`.json` linear model, or `.onnx` with the `onnx` feature)
    pub model_file: String,
    /// Scaler fitted on the 20-feature schema
    pub scaler_file: String,
    /// Scaler fitted on the full dataset, used when `scaler_file` is absent
    pub fallback_scaler_file: String,
    /// Label encoder mapping class ids to workout types
    pub label_encoder_file: String,
    /// Number of threads for ONNX inference
    pub onnx_threads: usize,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            base_dir: "AI".to_string(),
            model_file: "workout_model_top20_tuned.json".to_string(),
            scaler_file: "top20_scaler.json".to_string(),
            fallback_scaler_file: "full_dataset_scaler.json".to_string(),
            label_encoder_file: "target_label_encoder.json".to_string(),
            onnx_threads: 1,
        }
    }
}

/// Service metrics configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Seconds between logged summaries (0 disables periodic reporting)
    pub report_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 60,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    pub level: String,
    /// Log format (json, pretty)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from `FITLAB_CONFIG` or the default path.
    ///
    /// The file is optional; `FITLAB__SECTION__KEY` variables override it.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("FITLAB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::build(File::from(Path::new(&path)).required(false))
    }

    /// Load configuration from a specific path, which must exist
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::build(File::from(path.as_ref()))
    }

    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("FITLAB")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
