//! Standardization transform fitted offline and applied before inference

use crate::error::ScalerError;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Per-feature standardization: `(x - mean) / scale`.
///
/// Parameters are fixed at fit time. `scale` never contains zero; constant
/// columns are stored with a scale of `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Feature names in fit order, when known
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    /// Number of rows that contributed to the statistics
    #[serde(default)]
    pub n_samples_seen: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitted_at: Option<DateTime<Utc>>,
}

impl StandardScaler {
    /// Build a scaler from raw parameters, validating them.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let scaler = Self {
            feature_names: Vec::new(),
            mean,
            scale,
            n_samples_seen: 0,
            fitted_at: None,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Fit on column-major data, ignoring NaN cells per column.
    ///
    /// Uses the population standard deviation. Columns with zero variance
    /// (or no observed values) get a scale of `1.0`.
    pub fn fit(feature_names: Vec<String>, columns: &[Vec<f64>]) -> Result<Self> {
        if feature_names.len() != columns.len() {
            bail!(
                "{} feature names for {} columns",
                feature_names.len(),
                columns.len()
            );
        }

        let mut mean = Vec::with_capacity(columns.len());
        let mut scale = Vec::with_capacity(columns.len());

        for column in columns {
            let observed: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
            if observed.is_empty() {
                mean.push(0.0);
                scale.push(1.0);
                continue;
            }

            let n = observed.len() as f64;
            let m = observed.iter().sum::<f64>() / n;
            let variance = observed.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
            let std_dev = variance.sqrt();

            mean.push(m);
            scale.push(if std_dev < 10.0 * f64::EPSILON * m.abs().max(1.0) {
                1.0
            } else {
                std_dev
            });
        }

        let n_samples_seen = columns.first().map(|c| c.len() as u64).unwrap_or(0);
        let scaler = Self {
            feature_names,
            mean,
            scale,
            n_samples_seen,
            fitted_at: Some(Utc::now()),
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Load a scaler from its JSON export.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scaler from {}", path.display()))?;
        let scaler: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse scaler {}", path.display()))?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Write the scaler as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write scaler to {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if self.mean.is_empty() {
            bail!("scaler has no features");
        }
        if self.mean.len() != self.scale.len() {
            bail!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            );
        }
        if !self.feature_names.is_empty() && self.feature_names.len() != self.mean.len() {
            bail!(
                "scaler names {} features but stores {} means",
                self.feature_names.len(),
                self.mean.len()
            );
        }
        if let Some(i) = self.mean.iter().position(|m| !m.is_finite()) {
            bail!("scaler mean {i} is not finite");
        }
        if let Some(i) = self.scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            bail!("scaler scale {i} must be finite and non-zero");
        }
        Ok(())
    }

    /// Number of features the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardize a single feature vector.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ScalerError> {
        if features.len() != self.n_features() {
            return Err(ScalerError::DimensionMismatch {
                expected: self.n_features(),
                actual: features.len(),
            });
        }

        features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .enumerate()
            .map(|(index, (x, (mean, scale)))| {
                let z = (x - mean) / scale;
                if z.is_finite() {
                    Ok(z)
                } else {
                    Err(ScalerError::NonFinite { index })
                }
            })
            .collect()
    }
}
