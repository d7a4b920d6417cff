// crates/pcbook-cli/src/main.rs
//
// CLI entrypoint for the pcbook laptop catalog client.
//
// Provides subcommands for creating sample laptops, searching the catalog,
// uploading laptop images, rating laptops, and logging in.

mod commands;
mod config;
mod output;
mod session;

use clap::{Parser, Subcommand};
use commands::create::CreateCmd;
use commands::rate::RateCmd;
use commands::search::SearchCmd;
use commands::upload::UploadCmd;
use config::{ClientConfig, ConnectArgs, Settings};
use output::OutputFormat;

/// pcbook CLI: client for the laptop catalog server.
#[derive(Parser, Debug)]
#[command(name = "pcbook", version = "0.1.0", about = "pcbook laptop catalog client")]
struct Cli {
    #[command(flatten)]
    connect: ConnectArgs,

    /// Print results as JSON instead of a table.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Create random sample laptops.
    Create(CreateCmd),

    /// Search laptops by price, CPU, and RAM.
    Search(SearchCmd),

    /// Upload an image for a laptop.
    Upload(UploadCmd),

    /// Rate laptops and print their running averages.
    Rate(RateCmd),

    /// Log in and print an access token.
    Login,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::resolve(&cli.connect, ClientConfig::load_default());
    tracing::debug!("Connecting to {} as {}", settings.server, settings.username);

    match &cli.command {
        Commands::Create(cmd) => commands::create::run(cmd, &settings).await?,
        Commands::Search(cmd) => {
            commands::search::run(cmd, &settings, OutputFormat::from_flag(cli.json)).await?
        }
        Commands::Upload(cmd) => commands::upload::run(cmd, &settings).await?,
        Commands::Rate(cmd) => commands::rate::run(cmd, &settings).await?,
        Commands::Login => commands::login::run(&settings).await?,
    }

    Ok(())
}
