//! Prediction response data structures

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Per-class probabilities as percentages, in label-encoder class order.
///
/// Serialized as a JSON object keyed by label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassProbabilities(Vec<(String, f64)>);

impl ClassProbabilities {
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self(entries)
    }

    /// Percentage for a label, if the label is known.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(l, p)| (l.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all percentages (≈ 100 for a well-formed distribution).
    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, p)| p).sum()
    }

    /// Largest percentage, or 0 when empty.
    pub fn max(&self) -> f64 {
        self.0.iter().map(|(_, p)| *p).fold(0.0, f64::max)
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, probability) in &self.0 {
            map.serialize_entry(label, probability)?;
        }
        map.end()
    }
}

/// Result of a single workout-type prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Predicted workout type
    #[serde(rename = "prediction")]
    pub predicted_label: String,
    /// Probability of every known class, in percent
    pub probabilities: ClassProbabilities,
    /// Highest class probability, in percent
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_keep_class_order() {
        let probabilities = ClassProbabilities::new(vec![
            ("Yoga".to_string(), 10.0),
            ("Cardio".to_string(), 90.0),
        ]);

        let json = serde_json::to_string(&probabilities).unwrap();
        assert_eq!(json, r#"{"Yoga":10.0,"Cardio":90.0}"#);
        assert_eq!(probabilities.max(), 90.0);
        assert_eq!(probabilities.get("Yoga"), Some(10.0));
    }

    #[test]
    fn test_prediction_result_wire_shape() {
        let result = PredictionResult {
            predicted_label: "HIIT".to_string(),
            probabilities: ClassProbabilities::new(vec![("HIIT".to_string(), 100.0)]),
            confidence: 100.0,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["prediction"], "HIIT");
        assert_eq!(value["probabilities"]["HIIT"], 100.0);
        assert_eq!(value["confidence"], 100.0);
    }
}
