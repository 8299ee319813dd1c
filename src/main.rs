//! OCR Server
//!
//! Extracts text from uploaded images (English and Ukrainian) using Tesseract.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_server::config::Config;
use ocr_server::ocr::{OcrEngine, TesseractEngine};
use ocr_server::routes;
use ocr_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ocr_server=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting OCR Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Tesseract command: {}", config.ocr.tesseract_cmd);
    tracing::info!("Upload limit: {} bytes", config.server.max_upload_bytes);

    let engine = TesseractEngine::new(&config.ocr.tesseract_cmd);
    check_engine(&engine).await;

    let app_state = AppState::with_engine(config.clone(), Arc::new(engine));

    let app = routes::router(app_state).layer(TraceLayer::new_for_http());

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.server.host, config.server.port))?;
    tracing::info!("OCR Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Warn about a missing engine or language packs; requests will fail with 500 until fixed
async fn check_engine(engine: &TesseractEngine) {
    if !engine.is_available().await {
        tracing::warn!(
            "Tesseract not available at '{}'; text extraction requests will fail",
            engine.command()
        );
        return;
    }

    match engine.missing_languages().await {
        Ok(missing) if missing.is_empty() => {
            tracing::info!("Tesseract ready with all language packs");
        }
        Ok(missing) => {
            tracing::warn!(
                "Tesseract language packs not installed: {}",
                missing.join(", ")
            );
        }
        Err(e) => tracing::warn!("Failed to list Tesseract languages: {}", e),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
