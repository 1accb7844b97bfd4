// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tally — billing-cycle API usage reporting sidecar
//
//  Report API: axum on tokio
//  Config:     YAML file + TALLY_* env overrides
//  Storage:    in-memory append-only request log
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tally_api::server::AppState;
use tally_core::TallyConfig;
use tally_core::registry::RouteRegistry;
use tally_store::MemoryLog;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Tally — API usage reporting sidecar")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/tally/tally.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Tally starting");

    // ── Config ──
    let config = if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config file");
        TallyConfig::load(&cli.config)?
    } else {
        info!("No config file found, using defaults");
        TallyConfig::default()
    };

    // ── Route registry (declared route tree from config) ──
    let registry = Arc::new(RouteRegistry::new());
    registry.replace_all(config.routes.scopes.clone(), config.routes.routes.clone());
    info!(
        routes = registry.route_count(),
        patterns = registry.patterns().len(),
        "Route tree loaded"
    );

    // ── Request log ──
    let log = Arc::new(MemoryLog::new());

    // ── Report API ──
    let state = AppState {
        registry,
        log,
        report: config.report.clone(),
    };

    info!(
        addr = %config.server.addr,
        site_host = %config.report.site_host,
        restrict_to_current_site = config.report.restrict_to_current_site,
        "Tally is ready"
    );

    tokio::select! {
        result = tally_api::start(config.server.clone(), state) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping");
        }
    }

    info!("Tally stopped");
    Ok(())
}
