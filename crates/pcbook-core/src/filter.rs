// crates/pcbook-core/src/filter.rs
//
// Search predicate over laptops: an upper bound on price and lower bounds
// on CPU cores, CPU clock, and RAM.

use serde::{Deserialize, Serialize};

use crate::laptop::{Laptop, Memory};

/// Search filter. Every bound applies; a laptop matches only if it
/// satisfies all of them. An absent `min_ram` places no bound on memory.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Filter {
    #[prost(double, tag = "1")]
    pub max_price_usd: f64,
    #[prost(uint32, tag = "2")]
    pub min_cpu_cores: u32,
    #[prost(double, tag = "3")]
    pub min_cpu_ghz: f64,
    #[prost(message, optional, tag = "4")]
    pub min_ram: Option<Memory>,
}

impl Filter {
    /// Check whether a laptop satisfies every bound of this filter.
    ///
    /// RAM is compared in bits so a filter expressed in GB matches a laptop
    /// described in MB.
    pub fn matches(&self, laptop: &Laptop) -> bool {
        if laptop.price_usd > self.max_price_usd {
            return false;
        }
        if laptop.cpu_cores() < self.min_cpu_cores {
            return false;
        }
        if laptop.cpu_min_ghz() < self.min_cpu_ghz {
            return false;
        }
        let min_ram_bits = self.min_ram.as_ref().map(Memory::to_bits).unwrap_or(0);
        laptop.ram_bits() >= min_ram_bits
    }
}
