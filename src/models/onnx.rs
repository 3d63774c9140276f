//! ONNX Runtime classifier backend for scikit-learn exports

use crate::error::ModelError;
use crate::models::classifier::{argmax, Classifier};
use crate::models::onnx_io::IoNames;
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Classifier backed by an ONNX Runtime session.
///
/// skl2onnx classifiers expose an int64 label output and a probability output
/// that is either a `[1, n_classes]` float tensor or a `seq(map(int64, float))`.
pub struct OnnxClassifier {
    name: String,
    /// Running a session needs exclusive access
    session: Mutex<Session>,
    names: IoNames,
}

impl OnnxClassifier {
    /// Load a model from file
    pub fn load<P: AsRef<Path>>(path: P, onnx_threads: usize) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx".to_string());

        info!(model = %name, path = %path.display(), threads = onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        let inputs: Vec<&str> = session.inputs.iter().map(|i| i.name.as_str()).collect();
        let outputs: Vec<&str> = session.outputs.iter().map(|o| o.name.as_str()).collect();
        let names = IoNames::resolve(&inputs, &outputs);

        info!(
            model = %name,
            input = %names.input,
            label = ?names.label,
            probabilities = %names.probabilities,
            "Model loaded successfully"
        );

        Ok(Self {
            name,
            session: Mutex::new(session),
            names,
        })
    }

    fn run<T>(
        &self,
        features: &[f64],
        read: impl FnOnce(&SessionOutputs) -> Result<T, ModelError>,
    ) -> Result<T, ModelError> {
        let input: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let shape = vec![1_i64, input.len() as i64];
        let tensor = Tensor::from_array((shape, input))
            .map_err(|e| ModelError::Inference(format!("failed to create input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ModelError::Inference(format!("lock error: {e}")))?;
        let outputs = session
            .run(ort::inputs![self.names.input.as_str() => tensor])
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        read(&outputs)
    }

    fn read_probabilities(&self, outputs: &SessionOutputs) -> Result<Vec<f64>, ModelError> {
        let output = outputs
            .get(self.names.probabilities.as_str())
            .ok_or_else(|| {
                ModelError::Inference(format!("missing output {}", self.names.probabilities))
            })?;

        // Tensor format, zipmap disabled at export time
        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            debug!(model = %self.name, "Extracted probabilities from tensor");
            return Ok(data.iter().map(|&p| p as f64).collect());
        }

        let dtype = output.dtype();
        if DynSequenceValueType::can_downcast(&dtype) {
            return self.read_sequence_map(output);
        }

        Err(ModelError::Inference(format!(
            "unsupported probability output type {dtype:?}"
        )))
    }

    /// Read `seq(map(int64, float))`, the default skl2onnx zipmap output.
    fn read_sequence_map(&self, output: &DynValue) -> Result<Vec<f64>, ModelError> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| ModelError::Inference(format!("failed to downcast to sequence: {e}")))?;
        let maps = sequence
            .try_extract_sequence::<DynMapValueType>(&allocator)
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        // Batch size is always one
        let first = maps.first().ok_or(ModelError::EmptyOutput)?;
        let mut pairs = first
            .try_extract_key_values::<i64, f32>()
            .map_err(|e| ModelError::Inference(e.to_string()))?;
        pairs.sort_by_key(|(class_id, _)| *class_id);

        debug!(model = %self.name, classes = pairs.len(), "Extracted probabilities from seq(map)");
        Ok(pairs.into_iter().map(|(_, p)| p as f64).collect())
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.run(features, |outputs| self.read_probabilities(outputs))
    }

    /// One session run yields both the label output and the probabilities.
    fn classify(&self, features: &[f64]) -> Result<(usize, Vec<f64>), ModelError> {
        self.run(features, |outputs| {
            let probabilities = self.read_probabilities(outputs)?;
            let label = self
                .names
                .label
                .as_deref()
                .and_then(|n| outputs.get(n))
                .and_then(|value| value.try_extract_tensor::<i64>().ok())
                .and_then(|(_, data)| data.first().copied());

            let class_id = match label {
                Some(class_id) => usize::try_from(class_id).map_err(|_| {
                    ModelError::Inference(format!("negative class id {class_id}"))
                })?,
                None => argmax(&probabilities).ok_or(ModelError::EmptyOutput)?,
            };
            Ok((class_id, probabilities))
        })
    }
}
