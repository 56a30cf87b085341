use bytes::Bytes;

use crate::constants::{DEFAULT_QUALITY, MAX_DIMENSION, MAX_PIXELS};
use crate::errors::TransformError;
use crate::transform::{
    calculate_crop_box, calculate_target_dimensions, decode_image, encode_image, resize_image,
    OutputFormat, ResizePlan,
};

/// エンコード済みの派生画像
#[derive(Debug, Clone)]
pub struct ResizeResult {
    pub bytes: Bytes,
    pub content_type: &'static str,
}

/// デコード → 向き補正 → リサイズ → エンコードを行う
///
/// 出力フォーマットと品質はプロセス全体で固定。
/// 失敗はそのまま返し、内部でリトライはしない。
#[derive(Debug, Clone, Copy)]
pub struct ResizeEngine {
    format: OutputFormat,
    quality: u8,
    allow_enlargement: bool,
}

impl Default for ResizeEngine {
    fn default() -> Self {
        Self::new(OutputFormat::Jpeg, DEFAULT_QUALITY, true)
    }
}

impl ResizeEngine {
    pub fn new(format: OutputFormat, quality: u8, allow_enlargement: bool) -> Self {
        Self {
            format,
            quality,
            allow_enlargement,
        }
    }

    pub fn resize(&self, input: &[u8], plan: ResizePlan) -> Result<ResizeResult, TransformError> {
        validate_plan(plan)?;

        let (img, source_format) = decode_image(input)?;
        let (src_w, src_h) = (img.width(), img.height());
        validate_pixel_count(src_w, src_h)?;

        let (dst_w, dst_h) =
            calculate_target_dimensions(src_w, src_h, plan, self.allow_enlargement);
        validate_pixel_count(dst_w, dst_h)?;

        let crop = match plan {
            ResizePlan::Cover { .. } => Some(calculate_crop_box(src_w, src_h, dst_w, dst_h)),
            _ => None,
        };

        tracing::debug!(
            source_format = ?source_format,
            src_w,
            src_h,
            dst_w,
            dst_h,
            cropped = crop.is_some(),
            "resizing image"
        );

        let resized = if crop.is_none() && (dst_w, dst_h) == (src_w, src_h) {
            img
        } else {
            resize_image(&img, dst_w, dst_h, crop, self.format.supports_alpha())?
        };

        let output = encode_image(&resized, self.format, self.quality)?;

        Ok(ResizeResult {
            bytes: Bytes::from(output),
            content_type: self.format.content_type(),
        })
    }
}

/// クライアントが直接指定した高さ（切り抜きモードのみ）を検証する
///
/// 幅は許可リストで上限が決まっているので、ここでは見ない。
fn validate_plan(plan: ResizePlan) -> Result<(), TransformError> {
    match plan {
        ResizePlan::FitHeight(h) | ResizePlan::Cover { height: h, .. }
            if h == 0 || h > MAX_DIMENSION =>
        {
            Err(TransformError::InvalidParams(format!(
                "height must be 1-{MAX_DIMENSION}, got {h}"
            )))
        }
        _ => Ok(()),
    }
}

/// 総ピクセル数を検証し、メモリ枯渇を防ぐ
fn validate_pixel_count(width: u32, height: u32) -> Result<(), TransformError> {
    let total_pixels = width as u64 * height as u64;
    if total_pixels > MAX_PIXELS {
        return Err(TransformError::ResolutionTooLarge { width, height });
    }
    Ok(())
}
