use axum::http::StatusCode;
use resize_core::config::{invalid, Env};
use resize_core::ConfigError;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// HTTP サーバーの設定
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub listen_addr: String,
    pub cors_enabled: bool,
    /// 308 (既定) または 301
    pub redirect_status: StatusCode,
    pub log_format: LogFormat,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            cors_enabled: true,
            redirect_status: StatusCode::PERMANENT_REDIRECT,
            log_format: LogFormat::Text,
        }
    }
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env::new(lookup);
        let defaults = Self::default();

        let redirect_status = match env.string("REDIRECT_STATUS").as_deref() {
            None | Some("308") => StatusCode::PERMANENT_REDIRECT,
            Some("301") => StatusCode::MOVED_PERMANENTLY,
            Some(other) => {
                return Err(invalid("REDIRECT_STATUS", other.to_string(), "expected 301 or 308"));
            }
        };

        Ok(Self {
            listen_addr: env.string("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            cors_enabled: env.flag("CORS_ENABLED", defaults.cors_enabled)?,
            redirect_status,
            log_format: env.choice(
                "LOG_FORMAT",
                defaults.log_format,
                |v| match v.to_ascii_lowercase().as_str() {
                    "text" | "pretty" => Some(LogFormat::Text),
                    "json" => Some(LogFormat::Json),
                    _ => None,
                },
                "expected text or json",
            )?,
        })
    }
}
