//! Cat vs. dog image classification pipeline.
//!
//! Uploaded bytes flow through [`decode`], [`preprocess`], [`inference`] and
//! [`mapper`]; [`pipeline::classify_image`] chains them.

pub mod decode;
pub mod error;
pub mod inference;
pub mod mapper;
pub mod pipeline;
pub mod preprocess;
pub mod types;

pub use error::{InferenceError, ModelLoadError, PipelineError};
pub use inference::{infer, Classifier, OnnxClassifier};
pub use pipeline::classify_image;
pub use types::{InputTensor, Label, PredictionResult, Probability};
