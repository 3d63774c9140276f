//! Startup loading of the model, scaler and label encoder

use crate::config::ArtifactsConfig;
use crate::models::classifier::{Classifier, LinearClassifier};
use crate::models::inference::Predictor;
use crate::models::label_encoder::LabelEncoder;
use crate::models::scaler::StandardScaler;
use anyhow::{bail, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// The three artifacts a prediction needs. Any of them may be missing.
#[derive(Default)]
pub struct Artifacts {
    pub model: Option<Box<dyn Classifier>>,
    pub scaler: Option<StandardScaler>,
    pub label_encoder: Option<LabelEncoder>,
}

impl Artifacts {
    /// A predictor over the artifacts, or `None` if any failed to load.
    pub fn predictor(&self) -> Option<Predictor<'_>> {
        match (&self.model, &self.scaler, &self.label_encoder) {
            (Some(model), Some(scaler), Some(label_encoder)) => {
                Some(Predictor::new(model.as_ref(), scaler, label_encoder))
            }
            _ => None,
        }
    }

    pub fn status(&self) -> ArtifactStatus {
        ArtifactStatus {
            model_loaded: self.model.is_some(),
            scaler_loaded: self.scaler.is_some(),
            label_encoder_loaded: self.label_encoder.is_some(),
        }
    }
}

/// Per-artifact load outcome, as reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub model_loaded: bool,
    pub scaler_loaded: bool,
    pub label_encoder_loaded: bool,
}

impl ArtifactStatus {
    pub fn all_loaded(&self) -> bool {
        self.model_loaded && self.scaler_loaded && self.label_encoder_loaded
    }
}

/// Loader resolving artifact files under a base directory
pub struct ArtifactLoader<'a> {
    config: &'a ArtifactsConfig,
    schema: &'a [&'a str],
}

impl<'a> ArtifactLoader<'a> {
    pub fn new(config: &'a ArtifactsConfig, schema: &'a [&'a str]) -> Self {
        Self { config, schema }
    }

    fn resolve(&self, file: &str) -> PathBuf {
        Path::new(&self.config.base_dir).join(file)
    }

    /// Load every artifact, logging failures instead of returning them.
    pub fn load(&self) -> Artifacts {
        let artifacts = Artifacts {
            model: self.load_model(),
            scaler: self.load_scaler(),
            label_encoder: self.load_label_encoder(),
        };

        if let (Some(model), Some(scaler)) = (&artifacts.model, &artifacts.scaler) {
            if let Some(n) = model.n_features().filter(|&n| n != scaler.n_features()) {
                warn!(
                    model_features = n,
                    scaler_features = scaler.n_features(),
                    "Model and scaler disagree on feature count"
                );
            }
        }

        let status = artifacts.status();
        if status.all_loaded() {
            info!("Artifact initialization complete");
        } else {
            error!(
                model_loaded = status.model_loaded,
                scaler_loaded = status.scaler_loaded,
                label_encoder_loaded = status.label_encoder_loaded,
                "Artifact initialization incomplete, predictions are disabled"
            );
        }

        artifacts
    }

    fn load_model(&self) -> Option<Box<dyn Classifier>> {
        let path = self.resolve(&self.config.model_file);
        info!(path = %path.display(), "Loading model");

        if !path.exists() {
            error!(path = %path.display(), "Model file not found");
            return None;
        }

        match load_classifier(&path, self.config.onnx_threads) {
            Ok(model) => {
                info!(model = %model.name(), features = ?model.n_features(), "Model loaded successfully");
                Some(model)
            }
            Err(e) => {
                error!(path = %path.display(), error = %format!("{e:#}"), "Failed to load model");
                None
            }
        }
    }

    fn load_scaler(&self) -> Option<StandardScaler> {
        let primary = self.resolve(&self.config.scaler_file);
        let fallback = self.resolve(&self.config.fallback_scaler_file);

        let path = if primary.exists() {
            info!(path = %primary.display(), features = self.schema.len(), "Using feature-subset scaler");
            primary
        } else if fallback.exists() {
            warn!(
                path = %fallback.display(),
                "Using full dataset scaler as fallback, this may cause errors if feature dimensions don't match"
            );
            fallback
        } else {
            error!(
                primary = %primary.display(),
                fallback = %fallback.display(),
                "No scaler file found, run fit-scaler to generate one"
            );
            return None;
        };

        let loaded = StandardScaler::load(&path).and_then(|scaler| {
            check_feature_order(&scaler, self.schema)?;
            Ok(scaler)
        });

        match loaded {
            Ok(scaler) => {
                info!(features = scaler.n_features(), "Scaler loaded successfully");
                Some(scaler)
            }
            Err(e) => {
                error!(path = %path.display(), error = %format!("{e:#}"), "Failed to load scaler");
                None
            }
        }
    }

    fn load_label_encoder(&self) -> Option<LabelEncoder> {
        let path = self.resolve(&self.config.label_encoder_file);

        if !path.exists() {
            error!(path = %path.display(), "Label encoder not found");
            return None;
        }

        match LabelEncoder::load(&path) {
            Ok(encoder) => {
                info!(classes = ?encoder.classes(), "Label encoder loaded successfully");
                Some(encoder)
            }
            Err(e) => {
                error!(path = %path.display(), error = %format!("{e:#}"), "Failed to load label encoder");
                None
            }
        }
    }
}

/// Reject a scaler fitted on the schema's features in a different order.
///
/// A scaler of another width is accepted here and fails per request with a
/// dimension mismatch instead.
fn check_feature_order(scaler: &StandardScaler, schema: &[&str]) -> Result<()> {
    let names = &scaler.feature_names;
    if names.len() == schema.len() && names.iter().zip(schema).any(|(n, s)| n != s) {
        bail!("scaler features are not in feature schema order: {names:?}");
    }
    Ok(())
}

fn load_classifier(path: &Path, onnx_threads: usize) -> Result<Box<dyn Classifier>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("onnx") => load_onnx(path, onnx_threads),
        _ => Ok(Box::new(LinearClassifier::load(path)?)),
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path, onnx_threads: usize) -> Result<Box<dyn Classifier>> {
    Ok(Box::new(crate::models::onnx::OnnxClassifier::load(
        path,
        onnx_threads,
    )?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path, _onnx_threads: usize) -> Result<Box<dyn Classifier>> {
    bail!(
        "{} is an ONNX model but this build lacks the `onnx` feature",
        path.display()
    )
}
