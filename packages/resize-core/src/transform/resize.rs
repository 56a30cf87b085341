use crate::constants::MAX_PIXELS;
use crate::errors::TransformError;
use crate::transform::dimensions::CropBox;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, RgbImage, RgbaImage};

/// 画像をリサイズする
///
/// fast_image_resize の Lanczos3 フィルタを使用する。
/// `keep_alpha` が真でアルファを持つ画像は RGBA のまま処理する。
/// `crop` を指定すると元画像のその領域だけを出力に合わせる。
pub fn resize_image(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
    crop: Option<CropBox>,
    keep_alpha: bool,
) -> Result<DynamicImage, TransformError> {
    // ピクセル数チェック
    let total_pixels = target_w as u64 * target_h as u64;
    if total_pixels > MAX_PIXELS {
        return Err(TransformError::ResolutionTooLarge {
            width: target_w,
            height: target_h,
        });
    }

    let (width, height) = (img.width(), img.height());
    let with_alpha = keep_alpha && img.color().has_alpha();
    let (raw, pixel_type) = if with_alpha {
        (img.to_rgba8().into_raw(), PixelType::U8x4)
    } else {
        (img.to_rgb8().into_raw(), PixelType::U8x3)
    };

    let src_image = Image::from_vec_u8(width, height, raw, pixel_type).map_err(|e| {
        TransformError::ProcessingFailed(format!("failed to create source image: {e}"))
    })?;
    let mut dst_image = Image::new(target_w, target_h, pixel_type);

    let mut options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    if let Some(c) = crop {
        options = options.crop(c.left, c.top, c.width, c.height);
    }

    Resizer::new()
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| TransformError::ProcessingFailed(format!("resize failed: {e}")))?;

    let buffer = dst_image.into_vec();
    let converted = if with_alpha {
        RgbaImage::from_raw(target_w, target_h, buffer).map(DynamicImage::ImageRgba8)
    } else {
        RgbImage::from_raw(target_w, target_h, buffer).map(DynamicImage::ImageRgb8)
    };

    converted.ok_or_else(|| {
        TransformError::ProcessingFailed("failed to convert resized image".to_string())
    })
}
