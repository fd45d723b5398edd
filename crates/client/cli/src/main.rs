//! Terminal client entry point.
mod app;
mod config;
mod input;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::SettingsApp;
use config::CliConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _guard = setup_logging(config.session_id.as_deref())?;

    SettingsApp::builder(config).build().await?.run().await
}

/// Setup logging to a per-session file; stdout is reserved for the UI.
fn setup_logging(session_id: Option<&str>) -> Result<WorkerGuard> {
    let session_id = session_id.map(str::to_owned).unwrap_or_else(|| {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        format!("session_{timestamp}")
    });

    let session_log_dir = log_directory().join(&session_id);
    std::fs::create_dir_all(&session_log_dir)
        .with_context(|| format!("creating log directory {}", session_log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "settings.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/settings.log", session_log_dir.display());

    Ok(guard)
}

/// Platform cache directory for logs, falling back to the temp dir.
fn log_directory() -> PathBuf {
    directories::ProjectDirs::from("", "", "newsletter-settings")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("newsletter-settings").join("logs"))
}
