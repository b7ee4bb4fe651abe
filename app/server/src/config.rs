//! FILENAME: app/server/src/config.rs
// PURPOSE: Command line and environment configuration.

use clap::Parser;
use log::LevelFilter;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8099";
pub const DEFAULT_HASS_URL: &str = "ws://supervisor/core/websocket";

#[derive(Debug, Clone, Parser)]
#[command(name = "statistics-exporter", version, about = "Exports Home Assistant statistics as XLSX or delimited text")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "EXPORTER_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Home Assistant WebSocket API endpoint
    #[arg(long, env = "HASS_URL", default_value = DEFAULT_HASS_URL)]
    pub hass_url: String,

    /// Long-lived or supervisor access token
    #[arg(long, env = "SUPERVISOR_TOKEN", hide_env_values = true, value_parser = non_empty)]
    pub token: String,

    /// Also append log lines to this file
    #[arg(long, env = "EXPORTER_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[arg(long, env = "EXPORTER_LOG_LEVEL", default_value = "info", value_parser = parse_level)]
    pub log_level: LevelFilter,
}

fn non_empty(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err("must not be empty".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse()
        .map_err(|_| format!("unknown level {:?}", value))
}
