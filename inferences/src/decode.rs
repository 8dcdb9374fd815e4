use std::io::Cursor;

use image::io::Reader as ImageReader;

use crate::error::PipelineError;
use crate::types::CanonicalImage;

/// Decodes JPEG or PNG bytes into 8-bit RGB.
///
/// Alpha is dropped, greyscale and palette images are expanded to three
/// channels. The format is sniffed from the bytes, never from the declared
/// content type.
pub fn decode_image(bytes: &[u8]) -> Result<CanonicalImage, PipelineError> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .decode()?;

    Ok(img.to_rgb8())
}
