// crates/pcbook-core/src/sample.rs
//
// Random sample data for the CLI and tests.

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::filter::Filter;
use crate::laptop::{
    Cpu, Driver, Gpu, Keyboard, Laptop, Layout, Memory, Panel, Resolution, Screen, Storage, Unit,
    Weight,
};

/// A random laptop with a fresh UUID.
pub fn new_laptop() -> Laptop {
    let mut rng = rand::thread_rng();
    let brand = pick(&["Apple", "Dell", "Lenovo"]);
    let name = laptop_name(brand);

    Laptop {
        id: random_id(),
        brand: brand.to_string(),
        name: name.to_string(),
        cpu: Some(new_cpu()),
        ram: Some(Memory::new(rng.gen_range(4..=64), Unit::Gigabyte)),
        gpus: vec![new_gpu()],
        storages: vec![new_ssd(), new_hdd()],
        screen: Some(new_screen()),
        keyboard: Some(new_keyboard()),
        weight: Some(Weight::WeightKg(rng.gen_range(1.0..3.0))),
        price_usd: rng.gen_range(1500.0..3500.0),
        release_year: rng.gen_range(2015..=2019),
        updated_at: Utc::now().timestamp(),
    }
}

/// A random rating score in 1..=10.
pub fn random_score() -> f64 {
    rand::thread_rng().gen_range(1..=10) as f64
}

/// A filter loose enough to match a reasonable share of `new_laptop()`s.
pub fn new_filter() -> Filter {
    Filter {
        max_price_usd: 3000.0,
        min_cpu_cores: 4,
        min_cpu_ghz: 2.5,
        min_ram: Some(Memory::new(8, Unit::Gigabyte)),
    }
}

pub fn random_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn new_keyboard() -> Keyboard {
    let layout = *pick(&[Layout::Qwerty, Layout::Qwertz, Layout::Azerty]);
    Keyboard {
        layout: layout as i32,
        backlit: rand::thread_rng().gen_bool(0.5),
    }
}

pub fn new_cpu() -> Cpu {
    let mut rng = rand::thread_rng();
    let brand = pick(&["Intel", "AMD"]);
    let name = if *brand == "Intel" {
        pick(&["Xeon E-2286M", "Core i9-9980HK", "Core i7-9750H", "Core i5-9400F", "Core i3-1005G1"])
    } else {
        pick(&["Ryzen 7 PRO 2700U", "Ryzen 5 PRO 3500U", "Ryzen 3 PRO 3200GE"])
    };
    let number_cores = rng.gen_range(2..=8);
    let number_threads = rng.gen_range(number_cores..=12);
    let min_ghz = rng.gen_range(2.0..3.5);
    let max_ghz = rng.gen_range(min_ghz..5.0);

    Cpu {
        brand: brand.to_string(),
        name: name.to_string(),
        number_cores,
        number_threads,
        min_ghz,
        max_ghz,
    }
}

pub fn new_gpu() -> Gpu {
    let mut rng = rand::thread_rng();
    let brand = pick(&["Nvidia", "AMD"]);
    let name = if *brand == "Nvidia" {
        pick(&["RTX 2060", "RTX 2070", "GTX 1660-Ti", "GTX 1070"])
    } else {
        pick(&["RX 590", "RX 580", "RX 5700-XT", "RX Vega-56"])
    };
    let min_ghz = rng.gen_range(1.0..1.5);
    let max_ghz = rng.gen_range(min_ghz..2.0);

    Gpu {
        brand: brand.to_string(),
        name: name.to_string(),
        min_ghz,
        max_ghz,
        memory: Some(Memory::new(rng.gen_range(2..=6), Unit::Gigabyte)),
    }
}

pub fn new_ssd() -> Storage {
    Storage {
        driver: Driver::Ssd as i32,
        memory: Some(Memory::new(rand::thread_rng().gen_range(128..=1024), Unit::Gigabyte)),
    }
}

pub fn new_hdd() -> Storage {
    Storage {
        driver: Driver::Hdd as i32,
        memory: Some(Memory::new(rand::thread_rng().gen_range(1..=6), Unit::Terabyte)),
    }
}

pub fn new_screen() -> Screen {
    let mut rng = rand::thread_rng();
    let height = rng.gen_range(1080..=4320);
    let width = height * 16 / 9;
    let panel = *pick(&[Panel::Ips, Panel::Oled]);

    Screen {
        size_inch: rng.gen_range(13.0..17.0),
        resolution: Some(Resolution { width, height }),
        panel: panel as i32,
        multitouch: rng.gen_bool(0.5),
    }
}

fn laptop_name(brand: &str) -> &'static str {
    match brand {
        "Apple" => *pick(&["Macbook Air", "Macbook Pro"]),
        "Dell" => *pick(&["Latitude", "Vostro", "XPS", "Alienware"]),
        _ => *pick(&["Thinkpad X1", "Thinkpad P1", "Thinkpad P53"]),
    }
}

fn pick<T>(items: &'static [T]) -> &'static T {
    // Callers always pass non-empty literal slices.
    items
        .choose(&mut rand::thread_rng())
        .unwrap_or(&items[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_laptop_is_well_formed() {
        let laptop = new_laptop();
        assert!(Uuid::parse_str(&laptop.id).is_ok());
        assert!(["Apple", "Dell", "Lenovo"].contains(&laptop.brand.as_str()));
        assert!(laptop.cpu_cores() >= 2);
        let cpu = laptop.cpu.as_ref().unwrap();
        assert!(cpu.number_threads >= cpu.number_cores);
        assert!(cpu.max_ghz >= cpu.min_ghz);
        assert_eq!(laptop.storages.len(), 2);
        assert!((1500.0..3500.0).contains(&laptop.price_usd));
    }

    #[test]
    fn test_new_laptops_have_distinct_ids() {
        assert_ne!(new_laptop().id, new_laptop().id);
    }

    #[test]
    fn test_screen_is_16_by_9() {
        let screen = new_screen();
        let resolution = screen.resolution.unwrap();
        assert_eq!(resolution.width, resolution.height * 16 / 9);
    }

    #[test]
    fn test_random_score_in_range() {
        for _ in 0..100 {
            let score = random_score();
            assert!((1.0..=10.0).contains(&score));
        }
    }
}
