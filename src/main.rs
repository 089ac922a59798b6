mod adapters;
mod application;
mod config;
mod domain;

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::adapters::{
    fetch::http_fetcher::HttpImageFetcher,
    http::{router, state::HttpState},
    imaging::decoder::ImageCrateDecoder,
    onnx::{detector::OnnxDetector, model_catalog::OnnxModelCatalog},
};
use crate::application::{ports::ModelCatalogPort, services::DetectionService};
use crate::config::{AppConfig, LogFormat};
use crate::domain::categories::CategoryTable;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = AppConfig::parse();

    // 1. Logs: verbose unless RUST_LOG says otherwise
    init_tracing(cfg.log_format);

    info!("🔧 Initializing adapters...");
    let settings = cfg.detector_settings();
    info!(
        "🧠 Model {} at {} ({:?} layout, {:?} loading), conf={} nms={} input={}x{}",
        settings.model.name,
        settings.model.onnx_path,
        settings.layout,
        settings.loading,
        settings.params.conf_threshold,
        settings.params.nms_threshold,
        settings.params.input_width,
        settings.params.input_height,
    );

    // 2. A missing model is not fatal: requests answer 500 until it appears.
    let catalog = OnnxModelCatalog::new();
    if let Err(e) = catalog.validate_model(&settings.model).await {
        warn!("⚠️ Model check failed: {}", e);
    }

    let detector = Arc::new(OnnxDetector::new(settings));
    if let Err(e) = detector.warm_up().await {
        warn!("⚠️ Model warm-up failed, will retry on first request: {}", e);
    }

    if cfg.fetch_timeout().is_none() {
        info!("🌐 Image fetch timeout: none");
    }
    let fetcher = Arc::new(HttpImageFetcher::new(cfg.fetch_timeout())?);

    // 3. Use case
    let categories = CategoryTable::grocery();
    info!("🏷️ {} product categories", categories.len());
    let detection = Arc::new(DetectionService::new(
        fetcher,
        Arc::new(ImageCrateDecoder),
        detector,
        Arc::new(categories),
    ));

    // 4. Router
    let app = router(HttpState { detection });

    // 5. Serve
    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Detection server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("product_detector=debug,tower_http=debug"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init(),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("🛑 Ctrl-C received, shutting down");
    }
}
