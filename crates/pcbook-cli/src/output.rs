// crates/pcbook-cli/src/output.rs
//
// Output formatting utilities for the pcbook CLI.
// Supports table and JSON output modes.

use pcbook_core::laptop::{Laptop, Memory, Unit};
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// One laptop in a result table.
#[derive(Debug, Tabled)]
pub struct LaptopRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Brand")]
    pub brand: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Cores")]
    pub cores: u32,
    #[tabled(rename = "GHz")]
    pub ghz: String,
    #[tabled(rename = "RAM")]
    pub ram: String,
    #[tabled(rename = "Price (USD)")]
    pub price: String,
}

impl From<&Laptop> for LaptopRow {
    fn from(laptop: &Laptop) -> Self {
        Self {
            id: laptop.id.clone(),
            brand: laptop.brand.clone(),
            name: laptop.name.clone(),
            cores: laptop.cpu_cores(),
            ghz: format!("{:.2}", laptop.cpu_min_ghz()),
            ram: laptop
                .ram
                .as_ref()
                .map(format_memory)
                .unwrap_or_else(|| "--".to_string()),
            price: format!("{:.2}", laptop.price_usd),
        }
    }
}

/// Render a capacity such as `16 GB`.
pub fn format_memory(memory: &Memory) -> String {
    let unit = match memory.unit() {
        Unit::Unknown => "?",
        Unit::Bit => "bit",
        Unit::Byte => "B",
        Unit::Kilobyte => "KB",
        Unit::Megabyte => "MB",
        Unit::Gigabyte => "GB",
        Unit::Terabyte => "TB",
    };
    format!("{} {}", memory.value, unit)
}

/// Print laptops in the requested format.
pub fn print_laptops(laptops: &[Laptop], format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", format_json(&laptops)),
        OutputFormat::Table => {
            let rows: Vec<LaptopRow> = laptops.iter().map(LaptopRow::from).collect();
            println!("{}", format_table(&rows));
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}
