use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::Engine as _;
use chrono::Utc;
use serde::Deserialize;

use crate::response::expires_after_one_year;
use crate::AppState;
use resize_core::{
    ProxyError, ProxyOutcome, ProxyRequest, ResponseMode, StorageError, TransformError,
    CACHE_CONTROL_ONE_YEAR,
};

#[derive(Debug, Default, Deserialize)]
pub struct SizeQuery {
    pub width: Option<String>,
    pub height: Option<String>,
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// キーなし (`GET /`) は常に見つからない扱い
pub async fn root(
    State(state): State<AppState>,
    Query(query): Query<SizeQuery>,
    headers: HeaderMap,
) -> Result<Response, ErrorReply> {
    serve(&state, String::new(), query, &headers).await
}

pub async fn image(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<SizeQuery>,
    headers: HeaderMap,
) -> Result<Response, ErrorReply> {
    serve(&state, key, query, &headers).await
}

async fn serve(
    state: &AppState,
    key: String,
    query: SizeQuery,
    headers: &HeaderMap,
) -> Result<Response, ErrorReply> {
    tracing::info!(
        key = %key,
        width = ?query.width,
        height = ?query.height,
        "image request"
    );

    let request = ProxyRequest {
        key,
        width: query.width,
        height: query.height,
    };

    match state.proxy.handle(&request).await {
        Ok(outcome) => Ok(render(state, outcome)),
        Err(err) => Err(ErrorReply {
            error: err.into(),
            json: wants_json(headers),
        }),
    }
}

fn render(state: &AppState, outcome: ProxyOutcome) -> Response {
    let cache_control = HeaderValue::from_static(CACHE_CONTROL_ONE_YEAR);

    match outcome {
        ProxyOutcome::Redirect { location } => (
            state.redirect_status,
            [
                (header::LOCATION, location),
                (header::EXPIRES, expires_after_one_year(Utc::now())),
            ],
            [(header::CACHE_CONTROL, cache_control)],
        )
            .into_response(),
        ProxyOutcome::Image { body, content_type } => {
            let body = match state.proxy.settings().response_mode {
                ResponseMode::Base64 => {
                    axum::body::Body::from(base64::engine::general_purpose::STANDARD.encode(&body))
                }
                ResponseMode::Bytes | ResponseMode::Redirect => axum::body::Body::from(body),
            };
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type)],
                [(header::CACHE_CONTROL, cache_control)],
                body,
            )
                .into_response()
        }
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    PayloadTooLarge(String),
    TransformFailed(String),
    /// ストレージが返したステータスをそのまま返す
    Upstream { status: StatusCode, message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::TransformFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upstream { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::TransformFailed(msg)
            | AppError::Upstream { message: msg, .. } => msg,
        }
    }
}

impl From<ProxyError> for AppError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::Configuration(msg) => {
                tracing::error!(error = %msg, "proxy is not configured");
                AppError::NotFound(msg)
            }
            ProxyError::NotFound(msg) => {
                tracing::warn!(error = %msg, "image key missing");
                AppError::NotFound(msg)
            }
            ProxyError::Validation(msg) => {
                tracing::warn!(error = %msg, "validation error");
                AppError::Forbidden(msg)
            }
            ProxyError::Storage(storage_err) => storage_err.into(),
            ProxyError::Transform(transform_err) => transform_err.into(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { key } => {
                tracing::warn!(key = %key, "object not found");
                AppError::NotFound("Error: Image not found.".to_string())
            }
            StorageError::Forbidden => {
                tracing::error!("access denied by object storage (check bucket policy and credentials)");
                AppError::Forbidden("Error: Storage access denied.".to_string())
            }
            StorageError::TooLarge { size, max } => {
                tracing::warn!(size, max, "original image too large");
                AppError::PayloadTooLarge(format!(
                    "Error: Image is too large ({size} bytes, max {max})."
                ))
            }
            StorageError::Upstream { status, message } => {
                tracing::error!(status = ?status, error = %message, "storage error");
                let status = status
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                AppError::Upstream {
                    status,
                    message: format!("Error: {message}"),
                }
            }
        }
    }
}

impl From<TransformError> for AppError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::InvalidParams(msg) => {
                tracing::warn!(error = %msg, "invalid transform parameters");
                AppError::BadRequest(format!("Error: {msg}"))
            }
            TransformError::ResolutionTooLarge { width, height } => {
                tracing::warn!(width = %width, height = %height, "image resolution too large");
                AppError::BadRequest(format!(
                    "Error: Image resolution {width}x{height} exceeds the supported maximum."
                ))
            }
            TransformError::ProcessingFailed(msg) => {
                tracing::error!(error = %msg, "image processing failed");
                AppError::TransformFailed(format!("Error: {msg}"))
            }
        }
    }
}

/// エラー応答（`Accept: application/json` なら JSON、それ以外はプレーンテキスト）
#[derive(Debug)]
pub struct ErrorReply {
    pub error: AppError,
    pub json: bool,
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if self.json {
            let body = serde_json::json!({
                "error": self.error.message(),
                "status": status.as_u16(),
            });
            return (status, axum::Json(body)).into_response();
        }
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.error.message().to_string(),
        )
            .into_response()
    }
}
