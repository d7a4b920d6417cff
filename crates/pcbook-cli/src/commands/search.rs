// crates/pcbook-cli/src/commands/search.rs
//
// `pcbook search`: stream the laptops matching a filter.

use clap::Args;
use tokio_stream::StreamExt;

use pcbook_core::filter::Filter;
use pcbook_core::laptop::{Memory, Unit};
use pcbook_rpc::proto::SearchLaptopRequest;

use crate::config::Settings;
use crate::output::{print_laptops, OutputFormat};
use crate::session::Session;

#[derive(Debug, Args)]
pub struct SearchCmd {
    /// Highest acceptable price in USD.
    #[arg(long, default_value = "3000")]
    pub max_price: f64,

    /// Fewest acceptable CPU cores.
    #[arg(long, default_value = "4")]
    pub min_cores: u32,

    /// Lowest acceptable CPU base clock in GHz.
    #[arg(long, default_value = "2.5")]
    pub min_ghz: f64,

    /// Smallest acceptable RAM in GB.
    #[arg(long, default_value = "8")]
    pub min_ram_gb: u64,
}

impl SearchCmd {
    pub fn filter(&self) -> Filter {
        Filter {
            max_price_usd: self.max_price,
            min_cpu_cores: self.min_cores,
            min_cpu_ghz: self.min_ghz,
            min_ram: Some(Memory::new(self.min_ram_gb, Unit::Gigabyte)),
        }
    }
}

pub async fn run(
    cmd: &SearchCmd,
    settings: &Settings,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(settings).await?;

    let mut stream = session
        .laptops
        .search_laptop(SearchLaptopRequest {
            filter: Some(cmd.filter()),
        })
        .await?
        .into_inner();

    let mut found = Vec::new();
    while let Some(response) = stream.next().await {
        if let Some(laptop) = response?.laptop {
            tracing::debug!("found laptop with id: {}", laptop.id);
            found.push(laptop);
        }
    }

    if found.is_empty() && format == OutputFormat::Table {
        println!("No laptops match the filter.");
        return Ok(());
    }
    print_laptops(&found, format);
    Ok(())
}
