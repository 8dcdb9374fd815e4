use crate::decode::decode_image;
use crate::error::PipelineError;
use crate::inference::{infer, Classifier};
use crate::mapper::map_probability;
use crate::preprocess::to_input_tensor;
use crate::types::PredictionResult;

/// Decode, resize, infer, and threshold one uploaded image.
pub fn classify_image(
    classifier: Option<&dyn Classifier>,
    bytes: &[u8],
) -> Result<PredictionResult, PipelineError> {
    let image = decode_image(bytes)?;
    let tensor = to_input_tensor(&image)?;
    let probability = infer(classifier, &tensor)?;
    Ok(map_probability(probability))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;
    use crate::types::{InputTensor, Label};
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use ndarray::Array2;
    use std::io::Cursor;

    /// Scores by mean red intensity, so different images get different answers.
    struct Redness;

    impl Classifier for Redness {
        fn predict_batch(&self, input: &InputTensor) -> Result<Array2<f32>, InferenceError> {
            let view = input.view();
            let reds: Vec<f32> = view.iter().step_by(3).copied().collect();
            let mean = reds.iter().sum::<f32>() / reds.len() as f32;
            Ok(Array2::from_elem((1, 1), mean / 255.0))
        }
    }

    fn jpeg(color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(500, 500, Rgb(color));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Jpeg(95))
            .unwrap();
        buf
    }

    #[test]
    fn red_image_end_to_end() {
        let result = classify_image(Some(&Redness), &jpeg([255, 0, 0])).unwrap();
        assert_eq!(result.label, Label::Dog);
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn dark_image_is_cat() {
        let result = classify_image(Some(&Redness), &jpeg([0, 0, 0])).unwrap();
        assert_eq!(result.label, Label::Cat);
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn repeated_calls_agree() {
        let bytes = jpeg([200, 30, 90]);
        let first = classify_image(Some(&Redness), &bytes).unwrap();
        let second = classify_image(Some(&Redness), &bytes).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn stage_errors_propagate() {
        let err = classify_image(Some(&Redness), b"GIF89a nope").unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));

        let err = classify_image(None, &jpeg([1, 2, 3])).unwrap_err();
        assert!(matches!(err, PipelineError::Inference(InferenceError::NotLoaded)));
    }
}
