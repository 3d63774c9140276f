//! Mapping from class indices to workout-type names

use crate::error::EncoderError;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Label encoder exported from training.
///
/// `classes[i]` is the label the model reports as class `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            bail!("label encoder has no classes");
        }
        let mut seen = HashSet::new();
        if let Some(dup) = classes.iter().find(|c| !seen.insert(c.as_str())) {
            bail!("label encoder lists class {dup:?} twice");
        }
        Ok(Self { classes })
    }

    /// Load the encoder from its JSON export (`{"classes": [...]}`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read label encoder from {}", path.display()))?;
        let parsed: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse label encoder {}", path.display()))?;
        Self::new(parsed.classes)
    }

    /// Known labels in class-index order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Map a class index back to its label.
    pub fn inverse_transform(&self, index: usize) -> Result<&str, EncoderError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(EncoderError::UnknownClass {
                index,
                classes: self.classes.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> LabelEncoder {
        LabelEncoder::new(vec!["Cardio".into(), "HIIT".into(), "Strength".into(), "Yoga".into()])
            .unwrap()
    }

    #[test]
    fn test_inverse_transform() {
        let encoder = encoder();
        assert_eq!(encoder.inverse_transform(2), Ok("Strength"));
        assert_eq!(encoder.n_classes(), 4);
        assert_eq!(
            encoder.inverse_transform(4),
            Err(EncoderError::UnknownClass {
                index: 4,
                classes: 4
            })
        );
    }

    #[test]
    fn test_rejects_empty_and_duplicate_classes() {
        assert!(LabelEncoder::new(vec![]).is_err());
        assert!(LabelEncoder::new(vec!["Yoga".into(), "Yoga".into()]).is_err());
    }

    #[test]
    fn test_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target_label_encoder.json");
        std::fs::write(&path, r#"{"classes": ["Cardio", "Yoga"]}"#).unwrap();

        let encoder = LabelEncoder::load(&path).unwrap();
        assert_eq!(encoder.classes(), ["Cardio".to_string(), "Yoga".to_string()]);
    }
}
