//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;
use directories::ProjectDirs;

/// File name of the persisted key-value store
pub const STORE_FILE_NAME: &str = "focus-dash.json";

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "focus-dash")]
#[command(about = "A local focus timer daemon with persisted daily productivity stats")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Path of the JSON state file
    #[arg(short, long, env = "FOCUS_DASH_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Keep state in memory only
    #[arg(long, conflicts_with = "data_file")]
    pub ephemeral: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Resolve where the state file lives
    pub fn data_path(&self) -> PathBuf {
        if let Some(path) = &self.data_file {
            return path.clone();
        }

        if let Some(dirs) = ProjectDirs::from("", "", "focus-dash") {
            return dirs.data_local_dir().join(STORE_FILE_NAME);
        }

        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("focus-dash")
                .join(STORE_FILE_NAME),
            Err(_) => PathBuf::from(STORE_FILE_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_localhost() {
        let config = Config::try_parse_from(["focus-dash"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
        assert!(!config.ephemeral);
    }

    #[test]
    fn explicit_data_file_wins() {
        let config =
            Config::try_parse_from(["focus-dash", "--data-file", "/tmp/state.json", "-v"]).unwrap();
        assert_eq!(config.data_path(), PathBuf::from("/tmp/state.json"));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn ephemeral_conflicts_with_data_file() {
        assert!(Config::try_parse_from(["focus-dash", "--ephemeral", "-d", "x.json"]).is_err());
    }
}
