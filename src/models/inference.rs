//! Scaling, classification and label decoding for a single feature vector

use crate::error::{ModelError, PredictError};
use crate::models::classifier::{argmax, Classifier};
use crate::models::label_encoder::LabelEncoder;
use crate::models::scaler::StandardScaler;
use crate::types::{ClassProbabilities, PredictionResult};
use tracing::debug;

/// Borrowed view over the three loaded artifacts.
///
/// Only exists when all of them loaded, see [`crate::models::Artifacts::predictor`].
#[derive(Clone, Copy)]
pub struct Predictor<'a> {
    model: &'a dyn Classifier,
    scaler: &'a StandardScaler,
    label_encoder: &'a LabelEncoder,
}

impl<'a> Predictor<'a> {
    pub fn new(
        model: &'a dyn Classifier,
        scaler: &'a StandardScaler,
        label_encoder: &'a LabelEncoder,
    ) -> Self {
        Self {
            model,
            scaler,
            label_encoder,
        }
    }

    /// Run the full scale → classify → decode chain on a raw feature vector.
    pub fn predict(&self, features: &[f64]) -> Result<PredictionResult, PredictError> {
        let scaled = self.scaler.transform(features)?;

        let (class_index, probabilities) = self.model.classify(&scaled)?;

        if probabilities.len() != self.label_encoder.n_classes() {
            return Err(PredictError::ClassCountMismatch {
                model: probabilities.len(),
                encoder: self.label_encoder.n_classes(),
            });
        }
        check_distribution(&probabilities)?;

        let predicted_label = self.label_encoder.inverse_transform(class_index)?.to_string();

        let most_probable = argmax(&probabilities).ok_or(ModelError::EmptyOutput)?;
        if probabilities[class_index] < probabilities[most_probable] {
            return Err(PredictError::LabelDisagreement {
                class: class_index,
                most_probable,
            });
        }

        let probabilities = ClassProbabilities::new(
            self.label_encoder
                .classes()
                .iter()
                .zip(&probabilities)
                .map(|(label, p)| (label.clone(), p * 100.0))
                .collect(),
        );
        let confidence = probabilities.max();

        debug!(
            model = %self.model.name(),
            prediction = %predicted_label,
            confidence = confidence,
            "Prediction complete"
        );

        Ok(PredictionResult {
            predicted_label,
            probabilities,
            confidence,
        })
    }
}

/// Tolerance on the total probability mass
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-4;

fn check_distribution(probabilities: &[f64]) -> Result<(), PredictError> {
    if let Some((i, p)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || !(0.0..=1.0).contains(*p))
    {
        return Err(PredictError::InvalidProbabilities(format!(
            "class {i} has probability {p}"
        )));
    }

    let total: f64 = probabilities.iter().sum();
    if (total - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(PredictError::InvalidProbabilities(format!(
            "probabilities sum to {total}"
        )));
    }
    Ok(())
}
