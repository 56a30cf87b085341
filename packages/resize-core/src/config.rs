//! 環境変数からの設定読み込み
//!
//! 読み込みは起動時に一度だけ行い、以降は読み取り専用で共有する。
//! `BUCKET` と `URL` が無くても起動は失敗させず、リクエストごとに
//! 設定エラーを返す。値の形式が不正な場合は起動時エラー。

use crate::constants::{DEFAULT_MAX_INPUT_BYTES, DEFAULT_QUALITY};
use crate::errors::ConfigError;
use crate::storage::S3Options;
use crate::transform::{OutputFormat, ResizeEngine};

/// 画像を返す方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// 公開 URL へリダイレクトする
    Redirect,
    /// 画像バイト列をそのまま返す
    Bytes,
    /// base64 文字列で返す（API Gateway 経由の配信向け）
    Base64,
}

impl ResponseMode {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "redirect" => Some(Self::Redirect),
            "bytes" | "binary" => Some(Self::Bytes),
            "base64" => Some(Self::Base64),
            _ => None,
        }
    }

    pub fn returns_body(&self) -> bool {
        !matches!(self, Self::Redirect)
    }
}

/// 名前から値を引く関数で環境変数を読む
///
/// テストでプロセスの環境変数を書き換えずに済むよう、参照先を差し替えられる。
pub struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// 空文字は未設定として扱う
    pub fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn flag(&self, name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.string(name) {
            None => Ok(default),
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(invalid(name, v, "expected true or false")),
            },
        }
    }

    pub fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.string(name) {
            None => Ok(default),
            Some(v) => match v.parse::<T>() {
                Ok(parsed) => Ok(parsed),
                Err(e) => Err(invalid(name, v, &e.to_string())),
            },
        }
    }

    pub fn choice<T>(
        &self,
        name: &'static str,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
        expected: &str,
    ) -> Result<T, ConfigError> {
        match self.string(name) {
            None => Ok(default),
            Some(v) => parse(&v).ok_or_else(|| invalid(name, v, expected)),
        }
    }
}

pub fn invalid(name: &'static str, value: String, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name,
        value,
        reason: reason.to_string(),
    }
}

/// リクエスト処理の設定
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub bucket: Option<String>,
    /// バケットの公開ベース URL
    pub public_url: Option<String>,
    /// 派生画像の配信元（未設定なら `public_url`）
    pub cdn_url: Option<String>,
    pub response_mode: ResponseMode,
    /// リサイズ前に派生キーの存在を確認する
    pub check_variant_cache: bool,
    /// 幅と高さの両方が指定されたとき中央で切り抜く（レガシー）
    pub crop_to_height: bool,
    pub allow_enlargement: bool,
    pub output_format: OutputFormat,
    pub output_quality: u8,
    pub s3: S3Options,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            bucket: None,
            public_url: None,
            cdn_url: None,
            response_mode: ResponseMode::Redirect,
            check_variant_cache: true,
            crop_to_height: false,
            allow_enlargement: true,
            output_format: OutputFormat::Jpeg,
            output_quality: DEFAULT_QUALITY,
            s3: S3Options::default(),
        }
    }
}

impl ProxySettings {
    /// 環境変数から設定を作成する
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env::new(lookup);
        let defaults = Self::default();

        let output_quality = env.parsed("OUTPUT_QUALITY", defaults.output_quality)?;
        if output_quality == 0 || output_quality > 100 {
            return Err(invalid(
                "OUTPUT_QUALITY",
                output_quality.to_string(),
                "must be 1-100",
            ));
        }

        Ok(Self {
            bucket: env.string("BUCKET"),
            public_url: env.string("URL"),
            cdn_url: env.string("CDN_URL"),
            response_mode: env.choice(
                "RESPONSE_MODE",
                defaults.response_mode,
                ResponseMode::from_name,
                "expected redirect, bytes or base64",
            )?,
            check_variant_cache: env.flag("CHECK_VARIANT_CACHE", defaults.check_variant_cache)?,
            crop_to_height: env.flag("CROP_TO_HEIGHT", defaults.crop_to_height)?,
            allow_enlargement: env.flag("ALLOW_ENLARGEMENT", defaults.allow_enlargement)?,
            output_format: env.choice(
                "OUTPUT_FORMAT",
                defaults.output_format,
                OutputFormat::from_name,
                "expected jpeg, png or webp",
            )?,
            output_quality,
            s3: S3Options {
                endpoint: env.string("S3_ENDPOINT"),
                force_path_style: env.flag("S3_FORCE_PATH_STYLE", defaults.s3.force_path_style)?,
                public_read: env.flag("PUBLIC_READ", defaults.s3.public_read)?,
                max_input_bytes: env.parsed("MAX_INPUT_BYTES", DEFAULT_MAX_INPUT_BYTES)?,
            },
        })
    }

    pub fn engine(&self) -> ResizeEngine {
        ResizeEngine::new(self.output_format, self.output_quality, self.allow_enlargement)
    }

    /// 派生画像の配信元
    pub fn variant_base_url(&self) -> Option<&str> {
        self.cdn_url.as_deref().or(self.public_url.as_deref())
    }
}
