//! Growth chart service.
//!
//! Receives body-composition report links, compares the child against the
//! WHO 2007 growth references with six charts, uploads the charts and
//! writes the results back to the CRM.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use growth_api::config::ServiceConfig;
use growth_api::server::build_router;
use growth_api::state::AppState;
use reference_data::{ReferenceCatalog, ReferenceManifest};

#[derive(Parser, Debug)]
#[command(name = "growth-api")]
#[command(about = "WHO growth chart comparison service")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:5002", env = "LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting growth chart service");

    let config = ServiceConfig::from_env();

    if let Some(font) = &config.chart_font_path {
        if let Err(e) = renderer::register_chart_font(font) {
            warn!(path = %font.display(), error = %e, "Chart font not loaded; using the bundled font");
        }
    }

    // Load reference tables once; missing files only drop their entry
    let manifest = ReferenceManifest::who_2007(&config.reference_dir);
    let (catalog, report) =
        tokio::task::spawn_blocking(move || ReferenceCatalog::load(&manifest)).await?;
    for failed in &report.failed {
        error!(key = %failed.key, path = %failed.path, error = %failed.error, "Reference table unavailable");
    }
    info!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        "Reference catalog loaded"
    );

    tokio::fs::create_dir_all(&config.chart_output_dir).await?;

    let state = Arc::new(AppState::from_config(&config, Arc::new(catalog))?);
    let app = build_router(state);

    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
