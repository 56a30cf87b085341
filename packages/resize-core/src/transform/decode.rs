use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::errors::TransformError;
use crate::transform::orientation::read_orientation;

/// 画像バイト列をデコードし、EXIF Orientation を適用した画像と元のフォーマットを返す
pub fn decode_image(input: &[u8]) -> Result<(DynamicImage, Option<ImageFormat>), TransformError> {
    let reader = ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| TransformError::ProcessingFailed(format!("failed to guess format: {e}")))?;

    let source_format = reader.format();
    if source_format.is_none() {
        return Err(TransformError::ProcessingFailed(
            "unrecognized image format".to_string(),
        ));
    }

    let mut img = reader
        .decode()
        .map_err(|e| TransformError::ProcessingFailed(format!("decode failed: {e}")))?;

    if let Some(orientation) = read_orientation(input) {
        img.apply_orientation(orientation);
    }

    Ok((img, source_format))
}
