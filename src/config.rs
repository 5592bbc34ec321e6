//! TOML-based scenario configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::aggregate::MAX_WINDOW_DAYS;
use crate::appliance::{Appliance, ApplianceInventory};
use crate::factor::FactorTable;
use crate::sim::noise::{DEFAULT_HOURLY_NOISE, NoiseConfig};

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults. Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or use [`ScenarioConfig::baseline`]
/// for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run length, seed and reporting date.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Noise intensities.
    #[serde(default)]
    pub noise: NoiseSection,
    /// Grid carbon intensity table.
    #[serde(default)]
    pub emission_factors: EmissionFactorsConfig,
    /// Simulated households.
    #[serde(default)]
    pub homes: Vec<HomeConfig>,
}

/// Run length, seed and reporting date.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Master random seed.
    pub seed: u64,
    /// Number of days to backfill and report on (1 to [`MAX_WINDOW_DAYS`]).
    pub days: u32,
    /// Last simulated UTC day (`"YYYY-MM-DD"`); today when absent.
    pub end_date: Option<NaiveDate>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            days: 7,
            end_date: None,
        }
    }
}

/// Noise intensities, each in `[0, 1]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoiseSection {
    /// Intensity applied to every hourly gram value.
    pub hourly: f64,
    /// Per-appliance overrides for the usage-hours perturbation, keyed by appliance key.
    pub usage_hours: IndexMap<String, f64>,
}

impl Default for NoiseSection {
    fn default() -> Self {
        Self {
            hourly: DEFAULT_HOURLY_NOISE,
            usage_hours: IndexMap::new(),
        }
    }
}

impl NoiseSection {
    /// Builds the simulator noise table. Unknown appliance keys are ignored
    /// here; [`ScenarioConfig::validate`] reports them.
    pub fn to_noise_config(&self) -> NoiseConfig {
        NoiseConfig {
            hourly: self.hourly,
            usage_hours: self
                .usage_hours
                .iter()
                .filter_map(|(k, v)| Appliance::from_key(k).map(|a| (a, *v)))
                .collect(),
        }
    }
}

/// Grid carbon intensity table (kg CO2 per kWh).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmissionFactorsConfig {
    /// Factor for homes whose country is not listed.
    pub default: Option<f64>,
    /// Fail homes without a resolvable factor instead of using the simulator fallback.
    pub required: bool,
    /// Factors by ISO country code.
    pub countries: IndexMap<String, f64>,
}

impl EmissionFactorsConfig {
    pub fn to_factor_table(&self) -> FactorTable {
        let table = FactorTable::new(
            self.countries.iter().map(|(k, v)| (k.as_str(), *v)),
            self.default,
        );
        if self.required { table.required() } else { table }
    }
}

/// One simulated household.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomeConfig {
    /// Unique home identifier.
    pub id: String,
    /// ISO country code, used for the hemisphere and factor lookups.
    pub country_code: Option<String>,
    /// Home-specific emission factor (kg CO2 per kWh).
    pub emission_factor: Option<f64>,
    /// Appliance counts by appliance key.
    pub appliances: IndexMap<String, u32>,
}

impl HomeConfig {
    pub fn new(id: &str, country_code: Option<&str>, appliances: &[(&str, u32)]) -> Self {
        Self {
            id: id.to_string(),
            country_code: country_code.map(str::to_string),
            emission_factor: None,
            appliances: appliances
                .iter()
                .map(|(k, c)| ((*k).to_string(), *c))
                .collect(),
        }
    }

    /// The typed inventory; unknown appliance keys are dropped.
    pub fn inventory(&self) -> ApplianceInventory {
        ApplianceInventory::from_keys(self.appliances.iter().map(|(k, c)| (k.as_str(), *c)))
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field} — {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.days"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ScenarioConfig {
    /// Returns the baseline scenario: two northern-hemisphere homes.
    pub fn baseline() -> Self {
        Self {
            emission_factors: EmissionFactorsConfig {
                countries: [("US".to_string(), 0.386), ("GB".to_string(), 0.207)]
                    .into_iter()
                    .collect(),
                ..EmissionFactorsConfig::default()
            },
            homes: vec![
                HomeConfig::new(
                    "home-1",
                    Some("US"),
                    &[
                        ("airConditioner", 1),
                        ("refrigerator", 1),
                        ("tv", 2),
                        ("lights", 8),
                        ("microwave", 1),
                    ],
                ),
                HomeConfig::new(
                    "home-2",
                    Some("GB"),
                    &[
                        ("refrigerator", 1),
                        ("washingMachine", 1),
                        ("computer", 2),
                        ("electricStove", 1),
                        ("lights", 6),
                    ],
                ),
            ],
            ..Self::default()
        }
    }

    /// Returns the southern preset: homes where June is winter.
    pub fn southern() -> Self {
        Self {
            emission_factors: EmissionFactorsConfig {
                default: Some(0.5),
                countries: [("AU".to_string(), 0.68), ("NZ".to_string(), 0.1)]
                    .into_iter()
                    .collect(),
                ..EmissionFactorsConfig::default()
            },
            homes: vec![
                HomeConfig::new(
                    "sydney",
                    Some("AU"),
                    &[
                        ("airConditioner", 2),
                        ("refrigerator", 1),
                        ("fan", 3),
                        ("tv", 1),
                    ],
                ),
                HomeConfig::new(
                    "wellington",
                    Some("NZ"),
                    &[("refrigerator", 1), ("electricStove", 1), ("lights", 10)],
                ),
            ],
            ..Self::default()
        }
    }

    /// Returns the neighborhood preset: five mixed homes over a month.
    pub fn neighborhood() -> Self {
        let mut cfg = Self::baseline();
        cfg.simulation.days = 30;
        cfg.noise.hourly = 0.15;
        cfg.emission_factors.default = Some(0.475);
        cfg.homes.extend([
            HomeConfig::new(
                "home-3",
                Some("DE"),
                &[("refrigerator", 2), ("vacuumCleaner", 1), ("computer", 1)],
            ),
            HomeConfig::new(
                "home-4",
                Some("SG"),
                &[("airConditioner", 3), ("refrigerator", 1), ("fan", 4)],
            ),
            HomeConfig::new("home-5", None, &[("refrigerator", 1), ("tv", 1)]),
        ]);
        cfg
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "southern", "neighborhood"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "southern" => Ok(Self::southern()),
            "neighborhood" => Ok(Self::neighborhood()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Looks up a home by id.
    pub fn home(&self, id: &str) -> Option<&HomeConfig> {
        self.homes.iter().find(|h| h.id == id)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |field: String, message: String| errors.push(ConfigError { field, message });

        if self.simulation.days == 0 {
            push("simulation.days".into(), "must be > 0".into());
        } else if self.simulation.days > MAX_WINDOW_DAYS {
            push(
                "simulation.days".into(),
                format!("must be <= {MAX_WINDOW_DAYS}"),
            );
        }

        let n = &self.noise;
        if !is_intensity(n.hourly) {
            push("noise.hourly".into(), "must be in [0.0, 1.0]".into());
        }
        for (key, v) in &n.usage_hours {
            if Appliance::from_key(key).is_none() {
                push(
                    format!("noise.usage_hours.{key}"),
                    "unknown appliance key".into(),
                );
            } else if !is_intensity(*v) {
                push(
                    format!("noise.usage_hours.{key}"),
                    "must be in [0.0, 1.0]".into(),
                );
            }
        }

        let ef = &self.emission_factors;
        if ef.default.is_some_and(|f| !is_factor(f)) {
            push(
                "emission_factors.default".into(),
                "must be finite and > 0".into(),
            );
        }
        for (code, f) in &ef.countries {
            if !is_factor(*f) {
                push(
                    format!("emission_factors.countries.{code}"),
                    "must be finite and > 0".into(),
                );
            }
        }

        let mut seen = HashSet::new();
        for (i, home) in self.homes.iter().enumerate() {
            if home.id.trim().is_empty() {
                push(format!("homes[{i}].id"), "must not be empty".into());
            } else if !seen.insert(home.id.as_str()) {
                push(
                    format!("homes[{i}].id"),
                    format!("duplicate home id \"{}\"", home.id),
                );
            }
            if home.emission_factor.is_some_and(|f| !is_factor(f)) {
                push(
                    format!("homes[{i}].emission_factor"),
                    "must be finite and > 0".into(),
                );
            }
        }

        errors
    }
}

fn is_intensity(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

fn is_factor(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
seed = 7
days = 14
end_date = "2025-06-30"

[noise]
hourly = 0.05

[noise.usage_hours]
airConditioner = 0.2

[emission_factors]
default = 0.4
required = true

[emission_factors.countries]
FR = 0.056

[[homes]]
id = "paris"
country_code = "FR"

[homes.appliances]
refrigerator = 1
tv = 2

[[homes]]
id = "lyon"
emission_factor = 0.07

[homes.appliances]
fan = 1
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.as_ref().err());
        let cfg = cfg.unwrap_or_default();
        assert_eq!(cfg.simulation.days, 14);
        assert_eq!(cfg.simulation.end_date, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(cfg.homes.len(), 2);
        assert_eq!(cfg.homes[0].inventory().count(Appliance::Tv), 2);
        assert_eq!(cfg.homes[1].emission_factor, Some(0.07));
        assert!(cfg.emission_factors.required);
        assert!(cfg.validate().is_empty());
        let noise = cfg.noise.to_noise_config();
        assert_eq!(noise.usage_intensity(Appliance::AirConditioner), 0.2);
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
days = 3
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap_or_default();
        assert_eq!(cfg.simulation.seed, 99);
        assert_eq!(cfg.simulation.days, 7);
        assert_eq!(cfg.noise.hourly, DEFAULT_HOURLY_NOISE);
        assert!(cfg.homes.is_empty());
    }

    #[test]
    fn validation_catches_zero_days() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.days = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.days"));
    }

    #[test]
    fn validation_caps_days_at_max_window() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.days = MAX_WINDOW_DAYS;
        assert!(cfg.validate().is_empty());
        cfg.simulation.days = MAX_WINDOW_DAYS + 1;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "simulation.days" && e.message.contains("must be <="))
        );
    }

    #[test]
    fn validation_catches_bad_noise() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.noise.hourly = 1.5;
        cfg.noise.usage_hours.insert("heater".into(), 0.1);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "noise.hourly"));
        assert!(errors.iter().any(|e| e.field == "noise.usage_hours.heater"));
    }

    #[test]
    fn validation_catches_duplicate_and_empty_ids() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.homes.push(HomeConfig::new("home-1", None, &[]));
        cfg.homes.push(HomeConfig::new("  ", None, &[]));
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "homes[2].id"));
        assert!(errors.iter().any(|e| e.field == "homes[3].id"));
    }

    #[test]
    fn validation_catches_bad_factors() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.emission_factors.default = Some(-1.0);
        cfg.homes[0].emission_factor = Some(f64::NAN);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "emission_factors.default"));
        assert!(errors.iter().any(|e| e.field == "homes[0].emission_factor"));
    }

    #[test]
    fn southern_preset_is_southern() {
        use crate::sim::multipliers::{Hemisphere, hemisphere};
        let cfg = ScenarioConfig::southern();
        assert!(
            cfg.homes
                .iter()
                .all(|h| hemisphere(h.country_code.as_deref()) == Hemisphere::South)
        );
    }

    #[test]
    fn neighborhood_extends_baseline() {
        let base = ScenarioConfig::baseline();
        let hood = ScenarioConfig::neighborhood();
        assert!(hood.homes.len() > base.homes.len());
        assert!(hood.home("home-1").is_some());
        assert!(hood.home("home-9").is_none());
    }
}
