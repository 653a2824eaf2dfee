use anyhow::Result;
use colored::Colorize;
use nordflytt_api::{config, init_tracing, server};
use std::path::PathBuf;
use tracing::info;

/// Execute the start command
///
/// Loads the configuration, initializes logging from it and serves until
/// SIGTERM/SIGINT.
pub async fn execute(config_path: PathBuf) -> Result<()> {
    let cfg = config::load_config(&config_path)?;

    init_tracing(&cfg.server.log_level, &cfg.server.log_format)?;

    println!(
        "{} {}:{}",
        "Starting Nordflytt API on".green(),
        cfg.server.host,
        cfg.server.port
    );
    info!(config = %config_path.display(), "Starting Nordflytt API");

    server::start_server(cfg, config_path).await
}
