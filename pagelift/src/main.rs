use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagelift::api::{create_router, AppState};
use pagelift::config::Config;
use pagelift::ocr::OcrProvider;
use pagelift::raster::PdfiumRasterizer;
use pagelift::storage::GcsBlobStore;

#[derive(Parser)]
#[command(name = "pagelift")]
#[command(about = "Extracts per-page text from PDFs uploaded to a storage bucket")]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pagelift=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let mut config = Config::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    std::fs::create_dir_all(&config.processing.scratch_dir)?;
    tracing::info!(
        "Scratch directory: {}",
        config.processing.scratch_dir.display()
    );

    tracing::info!("Initializing OCR provider: {}...", config.ocr.languages);
    let ocr = OcrProvider::new(&config.ocr, config.processing.dpi);
    let ocr_available = ocr.is_available();
    if !ocr_available {
        tracing::warn!("OCR unavailable - every document will fail at text extraction");
    }

    let rasterizer = PdfiumRasterizer::new(&config.processing);
    tracing::info!("Rendering pages at {} DPI", rasterizer.dpi());

    tracing::info!("Initializing storage client: {}", config.storage.base_url);
    let store = GcsBlobStore::new(&config.storage)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(
        config,
        Arc::new(store),
        Arc::new(rasterizer),
        Arc::new(ocr),
        ocr_available,
    );
    let app = create_router(state);

    tracing::info!("Pagelift starting on http://{}", addr);
    tracing::info!("  Events:       POST http://{}/", addr);
    tracing::info!("  Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, finishing in-flight events...");
}
