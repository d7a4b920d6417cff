// crates/pcbook-daemon/src/main.rs
//
// Binary entrypoint for the pcbook daemon.
//
// Initializes tracing, parses CLI arguments, loads configuration, seeds
// the credential store, builds the stores and token manager, and serves
// the LaptopService and AuthService until Ctrl-C.

mod config;
mod seed;

use std::sync::Arc;

use clap::Parser;
use config::DaemonConfig;

use pcbook_core::token::TokenManager;
use pcbook_rpc::{PcbookRpcServer, RpcConfig};
use pcbook_store::{DiskImageStore, InMemoryLaptopStore, InMemoryRatingStore, InMemoryUserStore};

/// pcbook daemon: serves the laptop catalog over gRPC.
#[derive(Parser, Debug)]
#[command(name = "pcbook-daemon", version = "0.1.0", about = "pcbook laptop catalog server")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.pcbook/server.toml")]
    config: String,

    /// Port to listen on, overriding the config file.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // is not found.
    let config_path = expand_tilde(&args.config);
    let mut daemon_config = match DaemonConfig::load(&config_path) {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", config_path);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                config_path,
                e
            );
            DaemonConfig::default()
        }
    };

    // CLI --port flag overrides the config file value.
    if let Some(port) = args.port {
        daemon_config.rpc_port = port;
    }

    let image_dir = expand_tilde(&daemon_config.image_dir);

    tracing::info!("pcbook daemon v0.1.0");
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );
    tracing::info!("Image directory: {}", image_dir);
    tracing::info!("Token lifetime: {}s", daemon_config.token_duration_secs);

    // Credentials.
    let tokens = Arc::new(TokenManager::new(
        &daemon_config.token_secret,
        daemon_config.token_duration()?,
    )?);
    let users = Arc::new(InMemoryUserStore::new());
    let seeded = seed::seed_users(users.as_ref(), &daemon_config.users).await?;
    tracing::info!("Seeded {} users", seeded);

    // Catalog stores.
    let laptops = Arc::new(InMemoryLaptopStore::new());
    let images = Arc::new(DiskImageStore::new(&image_dir).await?);
    let ratings = Arc::new(InMemoryRatingStore::new());

    let rpc_config = RpcConfig {
        host: daemon_config.rpc_host.clone(),
        port: daemon_config.rpc_port,
    };
    let mut rpc_server = PcbookRpcServer::new(rpc_config, laptops, images, ratings, users, tokens);

    if let Some(tls) = &daemon_config.tls {
        tracing::info!("TLS enabled with certificate {}", tls.cert_path.display());
        rpc_server = rpc_server.with_tls(tls.load()?);
    }

    rpc_server.start().await?;

    tracing::info!("pcbook daemon stopped");
    Ok(())
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).display().to_string();
        }
    }
    path.to_string()
}
