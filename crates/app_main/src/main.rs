//! Gala - serve a directory of images and videos as a scrolling web gallery
//!
//! Main entry point for the `gala` binary.

mod handlers;
mod page;
mod server;

use anyhow::Result;
use app_core::{AppConfig, RecentDirectories};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "gala", version, about = "Browse a media directory from any browser on the local network")]
struct Cli {
    /// Directory to serve
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Do not launch a browser
    #[arg(long)]
    no_open: bool,

    /// Alternative configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Flags win over the configuration file
    fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.no_open {
            config.server.open_browser = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging and panic hook first
    let _guard = app_log::init()?;

    // Clean up old logs (7 days)
    if let Err(e) = app_log::cleanup_old_logs(&app_log::log_dir(), 7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("Gala starting...");

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable configuration: {}", e);
            AppConfig::default()
        }),
    };
    cli.apply(&mut config);

    if !cli.directory.is_dir() {
        anyhow::bail!("Directory not found: {}", cli.directory.display());
    }

    if cli.directory != Path::new(".") && config.history.enabled {
        RecentDirectories::new(config.history.path()).record(&cli.directory);
    }

    server::run(&cli.directory, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["gala"]);
        assert_eq!(cli.directory, PathBuf::from("."));

        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert!(config.server.open_browser);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["gala", "/srv/media", "--host", "0.0.0.0", "-p", "9000", "--no-open"]);
        assert_eq!(cli.directory, PathBuf::from("/srv/media"));

        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert!(!config.server.open_browser);
    }
}
