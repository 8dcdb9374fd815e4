use image::imageops::{self, FilterType};
use ndarray::Array4;

use crate::error::PipelineError;
use crate::types::{CanonicalImage, InputTensor, CHANNELS, IMG_HEIGHT, IMG_WIDTH};

/// Bicubic, the resampling the training images went through.
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Resizes to 224x224 and packs into `(1, H, W, C)`.
///
/// Values stay in 0-255: the classifier rescales in its first layer.
pub fn to_input_tensor(img: &CanonicalImage) -> Result<InputTensor, PipelineError> {
    to_input_tensor_sized(img, IMG_HEIGHT, IMG_WIDTH)
}

pub fn to_input_tensor_sized(
    img: &CanonicalImage,
    height: usize,
    width: usize,
) -> Result<InputTensor, PipelineError> {
    let resized = if img.dimensions() == (width as u32, height as u32) {
        img.clone()
    } else {
        imageops::resize(img, width as u32, height as u32, RESIZE_FILTER)
    };

    let data: Vec<f32> = resized.into_raw().into_iter().map(f32::from).collect();
    let array = Array4::from_shape_vec((1, height, width, CHANNELS), data)
        .map_err(|e| PipelineError::Preprocess(e.to_string()))?;

    Ok(InputTensor::new(array))
}
