//! Classifier abstraction and the linear (logistic regression) backend

use crate::error::ModelError;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A trained classifier over scaled feature vectors.
///
/// Implementations must be deterministic, and the class id from `classify`
/// must be a most probable class of the distribution it returns.
pub trait Classifier: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Input dimensionality, when the backend knows it
    fn n_features(&self) -> Option<usize> {
        None
    }

    /// Probability for every class, indexed by class id.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;

    /// Predicted class id together with the full distribution, from one run.
    fn classify(&self, features: &[f64]) -> Result<(usize, Vec<f64>), ModelError> {
        let probabilities = self.predict_proba(features)?;
        let class_id = argmax(&probabilities).ok_or(ModelError::EmptyOutput)?;
        Ok((class_id, probabilities))
    }
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Multinomial logistic regression exported as JSON.
///
/// One coefficient row per class with a softmax over the logits. A single row
/// is a binary model whose positive-class probability is the sigmoid of the
/// logit, reported as `[1 - p, p]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearClassifier {
    pub fn new(coefficients: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Result<Self> {
        let model = Self {
            coefficients,
            intercepts,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load a model from its JSON export.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model from {}", path.display()))?;
        let model: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse model {}", path.display()))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        let Some(first) = self.coefficients.first() else {
            bail!("linear model has no coefficient rows");
        };
        if first.is_empty() {
            bail!("linear model has no features");
        }
        if self.coefficients.iter().any(|row| row.len() != first.len()) {
            bail!("linear model coefficient rows differ in length");
        }
        if self.intercepts.len() != self.coefficients.len() {
            bail!(
                "linear model has {} coefficient rows but {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            );
        }
        let finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .all(|v| v.is_finite());
        if !finite {
            bail!("linear model contains non-finite parameters");
        }
        Ok(())
    }

    /// Number of classes the model scores.
    pub fn n_classes(&self) -> usize {
        match self.coefficients.len() {
            1 => 2,
            n => n,
        }
    }

    fn logits(&self, features: &[f64]) -> Vec<f64> {
        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect()
    }
}

impl Classifier for LinearClassifier {
    fn name(&self) -> &str {
        "linear"
    }

    fn n_features(&self) -> Option<usize> {
        self.coefficients.first().map(Vec::len)
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        let expected = self.n_features().unwrap_or(0);
        if features.len() != expected {
            return Err(ModelError::DimensionMismatch {
                expected,
                actual: features.len(),
            });
        }

        let logits = self.logits(features);
        if let [logit] = logits[..] {
            if !logit.is_finite() {
                return Err(ModelError::Inference(format!("logit is not finite: {logit}")));
            }
            let p = 1.0 / (1.0 + (-logit).exp());
            return Ok(vec![1.0 - p, p]);
        }

        // Shift by the max logit so exp() cannot overflow
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(ModelError::Inference("softmax normalizer is degenerate".into()));
        }
        Ok(exps.into_iter().map(|e| e / total).collect())
    }
}
