// crates/pcbook-core/src/laptop.rs
//
// Catalog messages: the Laptop record and its nested hardware descriptions.
//
// These are prost messages (standard protobuf wire format, no `.proto` file)
// so the RPC layer can carry them directly. They also derive serde so tests
// and the CLI can render them as JSON.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Unit of a memory quantity.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum Unit {
    Unknown = 0,
    Bit = 1,
    Byte = 2,
    Kilobyte = 3,
    Megabyte = 4,
    Gigabyte = 5,
    Terabyte = 6,
}

impl Unit {
    /// Number of bits in one of this unit. `Unknown` counts as zero.
    pub fn bits(self) -> u64 {
        match self {
            Unit::Unknown => 0,
            Unit::Bit => 1,
            Unit::Byte => 8,
            Unit::Kilobyte => 8 << 10,
            Unit::Megabyte => 8 << 20,
            Unit::Gigabyte => 8 << 30,
            Unit::Terabyte => 8 << 40,
        }
    }
}

/// A memory or storage capacity.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Memory {
    #[prost(uint64, tag = "1")]
    pub value: u64,
    #[prost(enumeration = "Unit", tag = "2")]
    pub unit: i32,
}

impl Memory {
    pub fn new(value: u64, unit: Unit) -> Self {
        Self {
            value,
            unit: unit as i32,
        }
    }

    /// Normalise to bits so capacities in different units compare correctly.
    /// Saturates instead of overflowing for absurd terabyte counts.
    pub fn to_bits(&self) -> u64 {
        self.value.saturating_mul(self.unit().bits())
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Cpu {
    #[prost(string, tag = "1")]
    pub brand: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(uint32, tag = "3")]
    pub number_cores: u32,
    #[prost(uint32, tag = "4")]
    pub number_threads: u32,
    #[prost(double, tag = "5")]
    pub min_ghz: f64,
    #[prost(double, tag = "6")]
    pub max_ghz: f64,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Gpu {
    #[prost(string, tag = "1")]
    pub brand: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(double, tag = "3")]
    pub min_ghz: f64,
    #[prost(double, tag = "4")]
    pub max_ghz: f64,
    #[prost(message, optional, tag = "5")]
    pub memory: Option<Memory>,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum Driver {
    Unknown = 0,
    Hdd = 1,
    Ssd = 2,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Storage {
    #[prost(enumeration = "Driver", tag = "1")]
    pub driver: i32,
    #[prost(message, optional, tag = "2")]
    pub memory: Option<Memory>,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum Panel {
    Unknown = 0,
    Ips = 1,
    Oled = 2,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Resolution {
    #[prost(uint32, tag = "1")]
    pub width: u32,
    #[prost(uint32, tag = "2")]
    pub height: u32,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Screen {
    #[prost(float, tag = "1")]
    pub size_inch: f32,
    #[prost(message, optional, tag = "2")]
    pub resolution: Option<Resolution>,
    #[prost(enumeration = "Panel", tag = "3")]
    pub panel: i32,
    #[prost(bool, tag = "4")]
    pub multitouch: bool,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum Layout {
    Unknown = 0,
    Qwerty = 1,
    Qwertz = 2,
    Azerty = 3,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Keyboard {
    #[prost(enumeration = "Layout", tag = "1")]
    pub layout: i32,
    #[prost(bool, tag = "2")]
    pub backlit: bool,
}

// ---------------------------------------------------------------------------
// Laptop
// ---------------------------------------------------------------------------

/// Weight of a laptop, in whichever unit the seller reported.
#[derive(Clone, PartialEq, prost::Oneof, Serialize, Deserialize)]
pub enum Weight {
    #[prost(double, tag = "10")]
    WeightKg(f64),
    #[prost(double, tag = "11")]
    WeightLb(f64),
}

/// A catalog item.
///
/// `id` is a UUID string. An empty id on a create request asks the server to
/// generate one.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
pub struct Laptop {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub brand: String,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(message, optional, tag = "4")]
    pub cpu: Option<Cpu>,
    #[prost(message, optional, tag = "5")]
    pub ram: Option<Memory>,
    #[prost(message, repeated, tag = "6")]
    pub gpus: Vec<Gpu>,
    #[prost(message, repeated, tag = "7")]
    pub storages: Vec<Storage>,
    #[prost(message, optional, tag = "8")]
    pub screen: Option<Screen>,
    #[prost(message, optional, tag = "9")]
    pub keyboard: Option<Keyboard>,
    #[prost(oneof = "Weight", tags = "10, 11")]
    pub weight: Option<Weight>,
    #[prost(double, tag = "12")]
    pub price_usd: f64,
    #[prost(uint32, tag = "13")]
    pub release_year: u32,
    /// Last update time, unix seconds.
    #[prost(int64, tag = "14")]
    pub updated_at: i64,
}

impl Laptop {
    /// CPU core count, zero when the CPU is not described.
    pub fn cpu_cores(&self) -> u32 {
        self.cpu.as_ref().map(|c| c.number_cores).unwrap_or(0)
    }

    /// CPU base clock, zero when the CPU is not described.
    pub fn cpu_min_ghz(&self) -> f64 {
        self.cpu.as_ref().map(|c| c.min_ghz).unwrap_or(0.0)
    }

    /// Installed RAM in bits, zero when not described.
    pub fn ram_bits(&self) -> u64 {
        self.ram.as_ref().map(Memory::to_bits).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// Running rating aggregate for one laptop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub count: u32,
    pub sum: f64,
}

impl Rating {
    /// Mean score, zero before the first rating.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }
}
