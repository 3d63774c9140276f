//! Feature extraction for workout-type model inference.
//!
//! This module turns a JSON request payload into the feature vector the
//! scaler and classifier were fitted on.

use crate::error::FieldError;
use serde_json::{Map, Value};

/// Number of features the workout model consumes.
pub const FEATURE_COUNT: usize = 20;

/// Feature names in the exact order used when the scaler and model were fitted.
///
/// Shared with the `fit-scaler` tool so the two cannot drift apart.
pub const FEATURE_SCHEMA: [&str; FEATURE_COUNT] = [
    "Calories_Burned",
    "cal_balance",
    "Session_Duration (hours)",
    "expected_burn",
    "Experience_Level",
    "Weight (kg)",
    "Calories",
    "Workout_Frequency (days/week)",
    "lean_mass_kg",
    "Water_Intake (liters)",
    "BMI",
    "BMI_calc",
    "protein_per_kg",
    "Burns Calories (per 30 min)_bc",
    "Burns Calories (per 30 min)",
    "cook_time_min",
    "cholesterol_mg",
    "sodium_mg",
    "Fat_Percentage",
    "serving_size_g",
];

/// Feature extractor that maps request payloads into model input vectors.
///
/// Every schema name is looked up independently. Missing names contribute
/// `0.0`; names outside the schema are ignored.
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    schema: &'static [&'static str],
}

impl FeatureExtractor {
    /// Create an extractor over the workout feature schema.
    pub fn new() -> Self {
        Self::with_schema(&FEATURE_SCHEMA)
    }

    /// Create an extractor over a custom ordered schema.
    pub fn with_schema(schema: &'static [&'static str]) -> Self {
        Self { schema }
    }

    /// Extract the feature vector from a payload, in schema order.
    ///
    /// Stops at the first value that cannot be read as a number and reports
    /// that field; later fields are not inspected.
    pub fn extract(&self, payload: &Map<String, Value>) -> Result<Vec<f64>, FieldError> {
        let mut features = Vec::with_capacity(self.schema.len());

        for &name in self.schema {
            let value = match payload.get(name) {
                Some(value) => coerce(value).ok_or_else(|| FieldError::new(name))?,
                None => 0.0,
            };
            features.push(value);
        }

        Ok(features)
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        self.schema.len()
    }

    /// Get feature names in extraction order.
    pub fn feature_names(&self) -> &'static [&'static str] {
        self.schema
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a JSON scalar as a finite `f64`.
///
/// Numbers and numeric strings are accepted, booleans read as `1.0`/`0.0`.
/// `null`, arrays, objects, non-numeric strings and NaN/infinity are rejected.
fn coerce(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    number.is_finite().then_some(number)
}
