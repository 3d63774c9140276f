//! Type definitions for the inference service

pub mod catalog;
pub mod prediction;

pub use catalog::{Meal, Workout};
pub use prediction::{ClassProbabilities, PredictionResult};
