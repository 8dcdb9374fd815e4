use ndarray::Array4;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InferenceError;

/// Spatial resolution the classifier was trained on.
pub const IMG_HEIGHT: usize = 224;
pub const IMG_WIDTH: usize = 224;
pub const CHANNELS: usize = 3;

/// Decoded pixels, always 8-bit RGB, source dimensions preserved.
pub type CanonicalImage = image::RgbImage;

/// Batch-of-one tensor in `(1, H, W, C)` layout, raw 0-255 values.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor(Array4<f32>);

impl InputTensor {
    pub(crate) fn new(data: Array4<f32>) -> Self {
        debug_assert_eq!(data.shape()[0], 1);
        Self(data)
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn view(&self) -> ndarray::ArrayView4<'_, f32> {
        self.0.view()
    }

    /// Contiguous values in row-major order.
    pub fn as_slice(&self) -> Option<&[f32]> {
        self.0.as_slice()
    }
}

/// Raw classifier score for the `Dog` class.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f32);

impl Probability {
    pub fn new(value: f32) -> Result<Self, InferenceError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InferenceError::MalformedOutput(format!(
                "probability {} is outside [0, 1]",
                value
            )))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

/// Class indices follow the alphabetical order used during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Label {
    Cat,
    Dog,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Cat => "Cat",
            Label::Dog => "Dog",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Cat" | "cat" => Ok(Label::Cat),
            "Dog" | "dog" => Ok(Label::Dog),
            other => Err(format!("unknown label: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    #[serde(rename = "prediction")]
    pub label: Label,
    /// Probability of the winning class, rounded to 4 decimals.
    pub confidence: f64,
}
