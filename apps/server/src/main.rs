mod args;

use anyhow::{Context, Result};
use clap::Parser;
use dashboard_app::{AppState, DashboardConfig};
use http_api::HttpState;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = args::Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = DashboardConfig::from_env().context("invalid configuration")?;
    if let Some(db_path) = cli.db_path.clone() {
        config.db_path = db_path;
    }
    if !config.has_auth_secret() {
        warn!("no PASSWORD or CRON_SECRET set; sync and usage endpoints will refuse requests");
    }
    if let Err(err) = config.assert_upstream() {
        warn!(error = %err, "upstream not configured; sync will fail until it is");
    }

    let app_state = AppState::new(config).context("failed to build application state")?;
    app_state
        .setup_db()
        .context("failed to initialize database")?;
    info!(db_path = %app_state.config.db_path.display(), "database ready");

    let router = http_api::router(HttpState::new(app_state));
    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", cli.host, cli.port))?;
    info!(addr = %listener.local_addr()?, "cliproxy dashboard listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down");
    Ok(())
}

fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = json_logs
        || std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
