use std::path::Path;

use log::info;
use ndarray::Array2;
use tract_onnx::prelude::*;

use crate::error::{InferenceError, ModelLoadError};
use crate::types::{InputTensor, Probability, CHANNELS, IMG_HEIGHT, IMG_WIDTH};

/// A loaded binary classifier emitting one sigmoid unit per example.
///
/// Implementations are shared read-only across concurrent requests, so
/// `predict_batch` must be safe to call from several threads at once.
pub trait Classifier: Send + Sync {
    /// Expected `(N, H, W, C)` input shape.
    fn input_shape(&self) -> [usize; 4] {
        [1, IMG_HEIGHT, IMG_WIDTH, CHANNELS]
    }

    /// Returns a `(batch, units)` matrix of scores.
    fn predict_batch(&self, input: &InputTensor) -> Result<Array2<f32>, InferenceError>;
}

/// Runs the classifier on a batch of one and extracts the score at `[0][0]`.
pub fn infer(
    classifier: Option<&dyn Classifier>,
    input: &InputTensor,
) -> Result<Probability, InferenceError> {
    let classifier = classifier.ok_or(InferenceError::NotLoaded)?;

    let expected = classifier.input_shape();
    if input.shape() != expected {
        return Err(InferenceError::Execution(format!(
            "input shape {:?} does not match expected {:?}",
            input.shape(),
            expected
        )));
    }

    let output = classifier.predict_batch(input)?;
    let score = output.get([0, 0]).copied().ok_or_else(|| {
        InferenceError::MalformedOutput(format!("empty output {:?}", output.shape()))
    })?;

    Probability::new(score)
}

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX export of the trained network, executed with tract.
///
/// A tract plan allocates fresh state on every `run`, so no lock is needed
/// around concurrent calls.
#[derive(Clone)]
pub struct OnnxClassifier {
    model: Plan,
    height: usize,
    width: usize,
}

impl OnnxClassifier {
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, ModelLoadError> {
        Self::load_sized(model_path, IMG_HEIGHT, IMG_WIDTH)
    }

    pub fn load_sized<P: AsRef<Path>>(
        model_path: P,
        height: usize,
        width: usize,
    ) -> Result<Self, ModelLoadError> {
        let path = model_path.as_ref();
        let model = Self::build_plan(path, height, width).map_err(|e| ModelLoadError {
            path: path.display().to_string(),
            reason: format!("{:#}", e),
        })?;

        info!("Loaded ONNX classifier from {}", path.display());
        Ok(Self {
            model,
            height,
            width,
        })
    }

    fn build_plan(path: &Path, height: usize, width: usize) -> TractResult<Plan> {
        tract_onnx::onnx()
            .model_for_path(path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, height, width, CHANNELS)),
            )?
            .into_optimized()?
            .into_runnable()
    }
}

impl Classifier for OnnxClassifier {
    fn input_shape(&self) -> [usize; 4] {
        [1, self.height, self.width, CHANNELS]
    }

    fn predict_batch(&self, input: &InputTensor) -> Result<Array2<f32>, InferenceError> {
        let values = input
            .as_slice()
            .ok_or_else(|| InferenceError::Execution("input tensor is not contiguous".into()))?;

        let tensor = Tensor::from_shape(input.shape(), values)
            .map_err(|e| InferenceError::Execution(e.to_string()))?;
        let outputs = self
            .model
            .run(tvec!(tensor.into()))
            .map_err(|e| InferenceError::Execution(format!("{:#}", e)))?;

        let first = outputs
            .first()
            .ok_or_else(|| InferenceError::MalformedOutput("model produced no outputs".into()))?;
        let view = first
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::MalformedOutput(e.to_string()))?;

        let (rows, cols) = match view.shape() {
            [rows, cols] => (*rows, *cols),
            [rows] => (*rows, 1),
            other => {
                return Err(InferenceError::MalformedOutput(format!(
                    "expected (batch, units) output, got {:?}",
                    other
                )))
            }
        };

        Array2::from_shape_vec((rows, cols), view.iter().copied().collect())
            .map_err(|e| InferenceError::MalformedOutput(e.to_string()))
    }
}
