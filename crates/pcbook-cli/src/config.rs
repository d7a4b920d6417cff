// crates/pcbook-cli/src/config.rs
//
// Connection settings for the CLI.
//
// Every setting can come from a command-line flag, from
// `~/.pcbook/client.toml`, or from a built-in default, in that order.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use serde::Deserialize;

const DEFAULT_SERVER: &str = "localhost:8080";
const DEFAULT_USERNAME: &str = "admin1";
const DEFAULT_PASSWORD: &str = "secret";
const DEFAULT_REFRESH_SECS: u64 = 30;

/// Connection flags shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectArgs {
    /// Server address, `host:port` or a full URL.
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Username to log in with.
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Password to log in with.
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// CA certificate (PEM) used to verify the server. Enables TLS.
    #[arg(long, global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Seconds between token refreshes.
    #[arg(long, global = true)]
    pub refresh_secs: Option<u64>,
}

/// Contents of `~/.pcbook/client.toml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    pub server: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub refresh_secs: Option<u64>,
}

impl ClientConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".pcbook").join("client.toml"))
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load the default file if it exists. A missing file yields an empty
    /// config; a broken one is reported and ignored.
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                tracing::debug!("Loaded client config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Could not load {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Fully resolved connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server: String,
    pub username: String,
    pub password: String,
    pub ca_cert: Option<PathBuf>,
    pub refresh_interval: Duration,
}

impl Settings {
    /// Flags win over the config file, which wins over defaults.
    pub fn resolve(args: &ConnectArgs, file: ClientConfig) -> Self {
        Self {
            server: args
                .server
                .clone()
                .or(file.server)
                .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            username: args
                .username
                .clone()
                .or(file.username)
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            password: args
                .password
                .clone()
                .or(file.password)
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            ca_cert: args.ca_cert.clone().or(file.ca_cert),
            refresh_interval: Duration::from_secs(
                args.refresh_secs
                    .or(file.refresh_secs)
                    .unwrap_or(DEFAULT_REFRESH_SECS),
            ),
        }
    }
}
