//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;

use home_emissions::config::HomeConfig;
use home_emissions::factor::FactorTable;
use home_emissions::record::{DailyRecord, DailyStore, MemoryStore, WriteMode};
use home_emissions::sim::noise::NoiseConfig;
use home_emissions::sim::{EmissionSimulator, HOURS_PER_DAY};

/// A day in June 2025 (UTC).
pub fn june(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).expect("valid June date")
}

/// Simulator with the default noise table.
pub fn default_simulator() -> EmissionSimulator {
    EmissionSimulator::default()
}

/// Simulator with every noise source switched off.
pub fn quiet_simulator() -> EmissionSimulator {
    EmissionSimulator::new(NoiseConfig::disabled())
}

/// Factor table with a few countries and a 0.5 default.
pub fn default_factors() -> FactorTable {
    FactorTable::new([("US", 0.4), ("AU", 0.7), ("GB", 0.2)], Some(0.5))
}

/// Two homes, one per hemisphere.
pub fn two_homes() -> Vec<HomeConfig> {
    vec![
        HomeConfig::new(
            "north",
            Some("US"),
            &[("refrigerator", 1), ("tv", 1), ("lights", 4)],
        ),
        HomeConfig::new(
            "south",
            Some("AU"),
            &[("refrigerator", 1), ("airConditioner", 1)],
        ),
    ]
}

/// Stores a record whose single `tv` series is `hourly` grams every hour.
pub fn put_flat(store: &MemoryStore, home: &str, date: NaiveDate, hourly: f64) {
    let rec = DailyRecord::for_day(home, date).with_series("tv", vec![hourly; HOURS_PER_DAY]);
    store
        .write(rec, WriteMode::Upsert)
        .expect("flat record should be accepted");
}
