use crate::constants::SUPPORTED_WIDTHS;
use crate::variant::Width;

/// 幅が許可リストに含まれるか（`AUTO` は常に許可）
pub fn is_valid_width(width: Width) -> bool {
    match width {
        Width::Auto => true,
        Width::Pixels(w) => SUPPORTED_WIDTHS.contains(&w),
    }
}
