use crate::variant::{SizeRequest, Width};

/// 出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    /// 文字列から OutputFormat を作成
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Content-Type を取得
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    /// アルファチャンネルを保持できるか
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

/// サイズ指定から導いたリサイズ方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePlan {
    /// 寸法を変えず再エンコードのみ
    Keep,
    FitWidth(u32),
    FitHeight(u32),
    /// 中央で切り抜いて指定サイズちょうどにする（レガシー）
    Cover { width: u32, height: u32 },
}

impl ResizePlan {
    /// `crop_to_height` が無効なら高さは無視して幅だけで決める
    pub fn from_request(size: &SizeRequest, crop_to_height: bool) -> Self {
        match (*size, crop_to_height) {
            (SizeRequest::Original, _) => Self::Keep,
            (SizeRequest::WidthOnly(Width::Pixels(w)), _) => Self::FitWidth(w),
            (SizeRequest::WidthOnly(Width::Auto), _) => Self::Keep,
            (SizeRequest::WidthHeight(Width::Pixels(w), _), false) => Self::FitWidth(w),
            (SizeRequest::WidthHeight(Width::Pixels(w), h), true) => Self::Cover {
                width: w,
                height: h,
            },
            (SizeRequest::WidthHeight(Width::Auto, _), false) => Self::Keep,
            (SizeRequest::WidthHeight(Width::Auto, h), true) => Self::FitHeight(h),
        }
    }
}
