use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Model not loaded")]
    NotLoaded,

    #[error("Inference failed: {0}")]
    Execution(String),

    #[error("Unexpected model output: {0}")]
    MalformedOutput(String),
}

#[derive(Error, Debug)]
#[error("Failed to load model {path}: {reason}")]
pub struct ModelLoadError {
    pub path: String,
    pub reason: String,
}

/// Failure of any stage after upload validation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot identify image file: {0}")]
    Decode(#[from] image::ImageError),

    #[error("{0}")]
    Preprocess(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}
