//! Core simulation types: hourly series helpers, summaries, and the simulator contract.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::appliance::ApplianceInventory;
use crate::error::ValidationError;

/// Number of entries in an hourly series; index = UTC hour of day.
pub const HOURS_PER_DAY: usize = 24;

/// Emission factor applied when the caller supplies none (kg CO2 per kWh).
pub const DEFAULT_EMISSION_FACTOR_KG_PER_KWH: f64 = 0.475;

/// 24 non-negative values, one per UTC hour of a calendar day.
pub type HourlyArray = Vec<f64>;

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A zero-filled hourly series.
pub fn zero_hourly() -> HourlyArray {
    vec![0.0; HOURS_PER_DAY]
}

/// Checks that `values` is a well-formed hourly series.
///
/// # Errors
///
/// Returns the first problem found: wrong length, then the earliest
/// non-finite or negative entry.
pub fn validate_hourly(series: &str, values: &[f64]) -> Result<(), ValidationError> {
    if values.len() != HOURS_PER_DAY {
        return Err(ValidationError::WrongLength {
            series: series.to_string(),
            len: values.len(),
        });
    }
    for (hour, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite {
                series: series.to_string(),
                hour,
            });
        }
        if value < 0.0 {
            return Err(ValidationError::Negative {
                series: series.to_string(),
                hour,
                value,
            });
        }
    }
    Ok(())
}

/// Returns the key with the greatest total, keeping the first one on ties.
pub fn top_by_total<'a, I>(totals: I) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut best: Option<(&str, f64)> = None;
    for (key, total) in totals {
        match best {
            Some((_, best_total)) if total <= best_total => {}
            _ => best = Some((key, total)),
        }
    }
    best.map(|(key, _)| key)
}

/// Whole-day headline figures for one home.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Grams of CO2 over the day.
    pub total_emissions: f64,
    /// Appliance key with the largest daily total, if any.
    pub top_appliance: Option<String>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} g CO2 (top: {})",
            self.total_emissions,
            self.top_appliance.as_deref().unwrap_or("-")
        )
    }
}

/// Inputs for one simulated home-day.
#[derive(Debug, Clone, Default)]
pub struct SimulationRequest {
    pub appliances: ApplianceInventory,
    /// ISO country code used for the hemisphere lookup.
    pub country_code: Option<String>,
    /// Only the UTC month and weekday are used; defaults to now.
    pub date: Option<DateTime<Utc>>,
    /// Grid intensity in kg CO2 per kWh.
    pub emission_factor_kg_per_kwh: Option<f64>,
}

/// Synthetic emissions for one home-day, in grams of CO2.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutput {
    /// Per-appliance hourly series keyed by appliance key, in inventory order.
    pub emissions: IndexMap<String, HourlyArray>,
    /// Whole-home hourly series.
    pub total_hourly: HourlyArray,
    pub summary: Summary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_000_1), 1.24);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn validate_accepts_well_formed_series() {
        assert!(validate_hourly("tv", &[1.5; HOURS_PER_DAY]).is_ok());
    }

    #[test]
    fn validate_rejects_wrong_length() {
        let err = validate_hourly("tv", &[1.0; 23]);
        assert_eq!(
            err,
            Err(ValidationError::WrongLength {
                series: "tv".into(),
                len: 23
            })
        );
    }

    #[test]
    fn validate_rejects_negative_and_non_finite() {
        let mut values = vec![0.0; HOURS_PER_DAY];
        values[5] = -0.5;
        assert!(matches!(
            validate_hourly("fan", &values),
            Err(ValidationError::Negative { hour: 5, .. })
        ));

        values[2] = f64::NAN;
        assert!(matches!(
            validate_hourly("fan", &values),
            Err(ValidationError::NonFinite { hour: 2, .. })
        ));
    }

    #[test]
    fn top_by_total_keeps_first_on_tie() {
        let top = top_by_total([("a", 3.0), ("b", 5.0), ("c", 5.0)]);
        assert_eq!(top, Some("b"));
        assert_eq!(top_by_total(Vec::<(&str, f64)>::new()), None);
    }

    #[test]
    fn summary_display_does_not_panic() {
        let s = Summary {
            total_emissions: 12.5,
            top_appliance: None,
        };
        assert!(format!("{s}").contains("12.50"));
    }
}
