use std::fmt;

use crate::constants::AUTO;
use crate::errors::ProxyError;
use crate::validation::is_valid_width;

/// リクエストされた幅
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Pixels(u32),
    /// 元画像の幅を維持する
    Auto,
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(w) => write!(f, "{w}"),
            Self::Auto => f.write_str(AUTO),
        }
    }
}

/// サイズ指定
///
/// 幅のみの指定が主な契約。高さは派生キーには含まれるが、
/// 切り抜きが有効な場合にのみリサイズ結果へ影響する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeRequest {
    /// 元画像をそのまま返す
    Original,
    WidthOnly(Width),
    WidthHeight(Width, u32),
}

impl SizeRequest {
    /// クエリパラメータの `width` / `height` からサイズ指定を作成する
    ///
    /// どちらも無ければ `Original`。リサイズが必要なのに幅が無い、
    /// 幅が許可リストに無い、数値として解釈できない場合は検証エラー。
    pub fn parse(width: Option<&str>, height: Option<&str>) -> Result<Self, ProxyError> {
        let width = width.map(str::trim).filter(|w| !w.is_empty());
        let height = height.map(str::trim).filter(|h| !h.is_empty());

        let Some(raw_width) = width else {
            return match height {
                None => Ok(Self::Original),
                Some(_) => Err(ProxyError::invalid_size()),
            };
        };

        let width = parse_width(raw_width).ok_or_else(ProxyError::invalid_size)?;
        if !is_valid_width(width) {
            return Err(ProxyError::invalid_size());
        }

        match height {
            None => Ok(Self::WidthOnly(width)),
            Some(h) if h.eq_ignore_ascii_case(AUTO) => Ok(Self::WidthOnly(width)),
            Some(h) => {
                let height = parse_positive(h).ok_or_else(ProxyError::invalid_size)?;
                Ok(Self::WidthHeight(width, height))
            }
        }
    }

    /// キーに埋め込む `WIDTHxHEIGHT` セグメント
    pub fn segment(&self) -> Option<String> {
        match self {
            Self::Original => None,
            Self::WidthOnly(w) => Some(format!("{w}x{AUTO}")),
            Self::WidthHeight(w, h) => Some(format!("{w}x{h}")),
        }
    }
}

fn parse_width(raw: &str) -> Option<Width> {
    if raw.eq_ignore_ascii_case(AUTO) {
        return Some(Width::Auto);
    }
    parse_positive(raw).map(Width::Pixels)
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|v| *v > 0)
}
