//! Appliance catalogue: the closed set of appliance kinds and their usage profiles.
//!
//! Every variant of [`Appliance`] carries exactly one [`ApplianceProfile`]
//! through [`Appliance::profile`], so an appliance that can appear in an
//! inventory always has a power rating, a daily usage figure and usage
//! windows.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::sim::window::UsageWindow;

/// Household appliance kinds known to the simulator.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Appliance {
    AirConditioner,
    Refrigerator,
    WashingMachine,
    Tv,
    Computer,
    Fan,
    Lights,
    VacuumCleaner,
    ElectricStove,
    Microwave,
}

/// Static usage characteristics of one appliance kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplianceProfile {
    /// Typical power draw while active (kW).
    pub power_rating_kw: f64,
    /// Mean hours of use per day.
    pub default_daily_usage_hours: f64,
    /// Hours of day during which the appliance is assumed active.
    pub usage_windows: &'static [UsageWindow],
    /// Default multiplicative noise intensity applied to the daily usage hours.
    pub usage_noise: f64,
}

static AIR_CONDITIONER: ApplianceProfile = ApplianceProfile {
    power_rating_kw: 1.5,
    default_daily_usage_hours: 6.0,
    usage_windows: &[UsageWindow::new(13.0, 17.0), UsageWindow::new(21.0, 1.0)],
    usage_noise: 0.3,
};

static REFRIGERATOR: ApplianceProfile = ApplianceProfile {
    power_rating_kw: 0.15,
    default_daily_usage_hours: 24.0,
    usage_windows: &[UsageWindow::new(0.0, 0.0)],
    usage_noise: 0.05,
};

static WASHING_MACHINE: ApplianceProfile = ApplianceProfile {
    power_rating_kw: 0.5,
    default_daily_usage_hours: 1.0,
    usage_windows: &[UsageWindow::new(8.0, 11.0)],
    usage_noise: 0.4,
};

static TV: ApplianceProfile = ApplianceProfile {
    power_rating_kw: 0.1,
    default_daily_usage_hours: 4.0,
    usage_windows: &[UsageWindow::new(18.0, 23.0)],
    usage_noise: 0.25,
};

static COMPUTER: ApplianceProfile = ApplianceProfile {
    power_rating_kw: 0.2,
    default_daily_usage_hours: 6.0,
    usage_windows: &[UsageWindow::new(9.0, 17.0)],
    usage_noise: 0.2,
};

static FAN: ApplianceProfile = ApplianceProfile {
    power_rating_kw: 0.075,
    default_daily_usage_hours: 8.0,
    usage_windows: &[UsageWindow::new(12.0, 22.0)],
    usage_noise: 0.2,
};

static LIGHTS: ApplianceProfile = ApplianceProfile {
    power_rating_kw: 0.06,
    default_daily_usage_hours: 6.0,
    usage_windows: &[UsageWindow::new(6.0, 8.0), UsageWindow::new(18.0, 23.0)],
    usage_noise: 0.15,
};

static VACUUM_CLEANER: ApplianceProfile = ApplianceProfile {
    power_rating_kw: 1.4,
    default_daily_usage_hours: 0.5,
    usage_windows: &[UsageWindow::new(10.0, 12.0)],
    usage_noise: 0.5,
};

static ELECTRIC_STOVE: ApplianceProfile = ApplianceProfile {
    power_rating_kw: 2.0,
    default_daily_usage_hours: 1.5,
    usage_windows: &[UsageWindow::new(7.0, 9.0), UsageWindow::new(18.0, 20.0)],
    usage_noise: 0.3,
};

static MICROWAVE: ApplianceProfile = ApplianceProfile {
    power_rating_kw: 1.2,
    default_daily_usage_hours: 0.3,
    usage_windows: &[
        UsageWindow::new(7.0, 8.0),
        UsageWindow::new(12.0, 13.0),
        UsageWindow::new(19.0, 20.0),
    ],
    usage_noise: 0.4,
};

impl Appliance {
    /// Returns the usage profile for this appliance kind.
    pub fn profile(self) -> &'static ApplianceProfile {
        match self {
            Self::AirConditioner => &AIR_CONDITIONER,
            Self::Refrigerator => &REFRIGERATOR,
            Self::WashingMachine => &WASHING_MACHINE,
            Self::Tv => &TV,
            Self::Computer => &COMPUTER,
            Self::Fan => &FAN,
            Self::Lights => &LIGHTS,
            Self::VacuumCleaner => &VACUUM_CLEANER,
            Self::ElectricStove => &ELECTRIC_STOVE,
            Self::Microwave => &MICROWAVE,
        }
    }

    /// The camelCase key used in inventories and persisted records.
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Parses an inventory key, returning `None` for keys outside the catalogue.
    pub fn from_key(key: &str) -> Option<Self> {
        key.parse().ok()
    }

    /// All appliance kinds in declaration order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

impl fmt::Display for Appliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Appliance counts owned by one home, in insertion order.
///
/// Deserializes from any string-keyed map; unknown keys are dropped as in
/// [`ApplianceInventory::from_keys`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ApplianceInventory(IndexMap<Appliance, u32>);

impl<'de> Deserialize<'de> for ApplianceInventory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, u32>::deserialize(deserializer)?;
        Ok(Self::from_keys(raw.iter().map(|(k, c)| (k.as_str(), *c))))
    }
}

impl ApplianceInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an inventory from raw string keys.
    ///
    /// Keys outside the catalogue are dropped; the simulator would skip them
    /// anyway since they have no profile.
    pub fn from_keys<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut inventory = Self::new();
        for (key, count) in entries {
            match Appliance::from_key(key) {
                Some(appliance) => inventory.set(appliance, count),
                None => tracing::debug!(key, "ignoring unknown appliance key"),
            }
        }
        inventory
    }

    /// Sets the count for `appliance`, keeping its original position if already present.
    pub fn set(&mut self, appliance: Appliance, count: u32) {
        self.0.insert(appliance, count);
    }

    pub fn count(&self, appliance: Appliance) -> u32 {
        self.0.get(&appliance).copied().unwrap_or(0)
    }

    /// Iterates `(appliance, count)` pairs in insertion order, zero counts included.
    pub fn iter(&self) -> impl Iterator<Item = (Appliance, u32)> + '_ {
        self.0.iter().map(|(a, c)| (*a, *c))
    }

    /// Returns `true` when no appliance has a positive count.
    pub fn is_idle(&self) -> bool {
        self.0.values().all(|&c| c == 0)
    }
}

impl FromIterator<(Appliance, u32)> for ApplianceInventory {
    fn from_iter<T: IntoIterator<Item = (Appliance, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_parse() {
        for appliance in Appliance::all() {
            assert_eq!(Appliance::from_key(appliance.key()), Some(appliance));
        }
    }

    #[test]
    fn keys_are_camel_case() {
        assert_eq!(Appliance::AirConditioner.key(), "airConditioner");
        assert_eq!(Appliance::Tv.key(), "tv");
        assert_eq!(Appliance::VacuumCleaner.key(), "vacuumCleaner");
    }

    #[test]
    fn every_profile_is_usable() {
        for appliance in Appliance::all() {
            let p = appliance.profile();
            assert!(p.power_rating_kw > 0.0, "{appliance} power");
            assert!(p.default_daily_usage_hours > 0.0, "{appliance} hours");
            assert!(!p.usage_windows.is_empty(), "{appliance} windows");
            assert!((0.0..=1.0).contains(&p.usage_noise), "{appliance} noise");
        }
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let inv = ApplianceInventory::from_keys([("heater", 2), ("tv", 1)]);
        assert_eq!(inv.count(Appliance::Tv), 1);
        assert_eq!(inv.iter().count(), 1);
    }

    #[test]
    fn idle_when_all_counts_zero() {
        let inv = ApplianceInventory::from_keys([("tv", 0), ("fan", 0)]);
        assert!(inv.is_idle());
        assert!(ApplianceInventory::new().is_idle());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let inv: ApplianceInventory = [(Appliance::AirConditioner, 2)].into_iter().collect();
        let json = serde_json::to_string(&inv).unwrap_or_default();
        assert_eq!(json, r#"{"airConditioner":2}"#);
    }

    #[test]
    fn deserialize_drops_unknown_keys() {
        let inv: ApplianceInventory =
            serde_json::from_str(r#"{"heater":2,"tv":1,"washingMachine":0}"#)
                .expect("unknown keys are tolerated");
        assert_eq!(inv.count(Appliance::Tv), 1);
        assert_eq!(
            inv.iter().collect::<Vec<_>>(),
            vec![(Appliance::Tv, 1), (Appliance::WashingMachine, 0)]
        );
    }
}
