//! 画像リサイズプロキシのエントリポイント

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resize_core::{ImageProxy, MemoryStore, ObjectStore, ProxySettings, S3ObjectStore};
use resize_proxy::config::{LogFormat, ServerSettings};
use resize_proxy::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env があれば読み込む
    dotenvy::dotenv().ok();

    let server = ServerSettings::from_env()?;
    init_tracing(server.log_format);

    let settings = ProxySettings::from_env()?;
    let store: Arc<dyn ObjectStore> = match settings.bucket.as_deref() {
        Some(bucket) => {
            info!(
                bucket = %bucket,
                endpoint = ?settings.s3.endpoint,
                response_mode = ?settings.response_mode,
                "object storage configured"
            );
            Arc::new(S3ObjectStore::connect(bucket, &settings.s3).await)
        }
        None => {
            // 全リクエストが設定エラーで終わるのでストアには到達しない
            warn!("BUCKET is not set; every image request will fail with a configuration error");
            Arc::new(MemoryStore::new())
        }
    };
    if settings.public_url.is_none() {
        warn!("URL is not set; every image request will fail with a configuration error");
    }

    let state = AppState::new(ImageProxy::new(settings, store), &server);
    let app = create_router(state, &server);

    let listener = TcpListener::bind(&server.listen_addr).await?;
    info!("Server listening on {}", server.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "resize_proxy=info,resize_core=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
