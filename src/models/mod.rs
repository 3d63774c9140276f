//! Model artifacts and inference components

pub mod classifier;
pub mod inference;
pub mod label_encoder;
pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod onnx_io;
pub mod scaler;

pub use classifier::{Classifier, LinearClassifier};
pub use inference::Predictor;
pub use label_encoder::LabelEncoder;
pub use loader::{ArtifactLoader, ArtifactStatus, Artifacts};
pub use scaler::StandardScaler;
