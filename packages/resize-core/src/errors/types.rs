use thiserror::Error;

/// リクエスト処理の統合エラー型
#[derive(Debug, Error)]
pub enum ProxyError {
    /// バケット名や公開 URL が設定されていない
    #[error("{0}")]
    Configuration(String),

    /// キーが空、または元画像が存在しない
    #[error("{0}")]
    NotFound(String),

    /// サポートされていないサイズ指定
    #[error("{0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
}

impl ProxyError {
    pub fn missing_config(name: &str) -> Self {
        Self::Configuration(format!("Error: Set environment variables {name}."))
    }

    pub fn image_not_found() -> Self {
        Self::NotFound("Error: Image not found.".to_string())
    }

    pub fn invalid_size() -> Self {
        Self::Validation("Error: Invalid image size.".to_string())
    }
}

/// ストレージアクセスエラー
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("access denied")]
    Forbidden,

    #[error("object too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    /// ストレージが返したステータスとメッセージをそのまま保持する
    #[error("upstream error{}: {message}", status_suffix(.status))]
    Upstream {
        status: Option<u16>,
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

/// 画像変換エラー
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("image resolution exceeds maximum ({width}x{height})")]
    ResolutionTooLarge { width: u32, height: u32 },

    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}

/// 起動時の設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            ProxyError::missing_config("BUCKET").to_string(),
            "Error: Set environment variables BUCKET."
        );
        assert_eq!(ProxyError::image_not_found().to_string(), "Error: Image not found.");
        assert_eq!(ProxyError::invalid_size().to_string(), "Error: Invalid image size.");
    }

    #[test]
    fn test_upstream_display() {
        let err = StorageError::Upstream {
            status: Some(503),
            message: "slow down".to_string(),
        };
        assert_eq!(err.to_string(), "upstream error (503): slow down");

        let err = StorageError::Upstream {
            status: None,
            message: "dispatch failure".to_string(),
        };
        assert_eq!(err.to_string(), "upstream error: dispatch failure");
    }
}
