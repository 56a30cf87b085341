pub mod config;
pub mod handler;
pub mod response;

use std::sync::Arc;

use axum::http::{header, HeaderName, Method, StatusCode};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::ServerSettings;
use resize_core::ImageProxy;

/// ハンドラ間で共有する状態
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<ImageProxy>,
    pub redirect_status: StatusCode,
}

impl AppState {
    pub fn new(proxy: ImageProxy, server: &ServerSettings) -> Self {
        Self {
            proxy: Arc::new(proxy),
            redirect_status: server.redirect_status,
        }
    }
}

pub fn create_router(state: AppState, server: &ServerSettings) -> Router {
    let router = Router::new()
        .route("/healthz", get(handler::health))
        .route("/", get(handler::root))
        .route("/{*key}", get(handler::image))
        .layer(TraceLayer::new_for_http());

    let router = if server.cors_enabled {
        router.layer(cors_layer())
    } else {
        router
    };

    router.with_state(state)
}

/// ブラウザから直接読み込むクライアント向けの CORS
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderName::from_static("x-amz-date"),
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-amz-security-token"),
        ])
}
