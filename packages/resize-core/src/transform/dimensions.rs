use crate::transform::params::ResizePlan;

/// 元画像から切り出す領域（fast_image_resize の crop 引数）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// 倍率を適用して新しい寸法を計算する
fn apply_scale(src_w: u32, src_h: u32, scale: f64) -> (u32, u32) {
    let new_w = (src_w as f64 * scale).round() as u32;
    let new_h = (src_h as f64 * scale).round() as u32;

    // 最小1pxを保証
    (new_w.max(1), new_h.max(1))
}

fn limit_scale(scale: f64, allow_enlargement: bool) -> f64 {
    if allow_enlargement { scale } else { scale.min(1.0) }
}

/// 出力寸法を計算する
///
/// 幅・高さ指定はアスペクト比を維持する。`Cover` は指定サイズちょうど
/// （拡大禁止時は同じ比率のまま元画像に収まるまで縮める）。
pub fn calculate_target_dimensions(
    src_w: u32,
    src_h: u32,
    plan: ResizePlan,
    allow_enlargement: bool,
) -> (u32, u32) {
    match plan {
        ResizePlan::Keep => (src_w, src_h),
        ResizePlan::FitWidth(w) => {
            let scale = limit_scale(w as f64 / src_w as f64, allow_enlargement);
            apply_scale(src_w, src_h, scale)
        }
        ResizePlan::FitHeight(h) => {
            let scale = limit_scale(h as f64 / src_h as f64, allow_enlargement);
            apply_scale(src_w, src_h, scale)
        }
        ResizePlan::Cover { width, height } => {
            if allow_enlargement || (width <= src_w && height <= src_h) {
                return (width, height);
            }
            let shrink = (src_w as f64 / width as f64).min(src_h as f64 / height as f64);
            apply_scale(width, height, shrink)
        }
    }
}

/// 出力と同じアスペクト比になるよう、元画像の中央を切り出す領域を計算する
pub fn calculate_crop_box(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> CropBox {
    let (src_w, src_h) = (src_w as f64, src_h as f64);
    let dst_ratio = dst_w as f64 / dst_h as f64;

    if src_w / src_h > dst_ratio {
        // 横長すぎる: 左右を落とす
        let width = src_h * dst_ratio;
        CropBox {
            left: (src_w - width) / 2.0,
            top: 0.0,
            width,
            height: src_h,
        }
    } else {
        let height = src_w / dst_ratio;
        CropBox {
            left: 0.0,
            top: (src_h - height) / 2.0,
            width: src_w,
            height,
        }
    }
}
