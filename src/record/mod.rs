//! Persisted per-home, per-day emission records.
//!
//! A [`DailyRecord`] stores one hourly series per appliance alongside a
//! whole-home total and a summary. The total and summary are derived data:
//! [`DailyRecord::enforce_invariants`] recomputes them from the appliance
//! series on every write so a stored record is always self-consistent.

pub mod store;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::sim::types::{
    HourlyArray, SimulationOutput, Summary, round2, top_by_total, validate_hourly, zero_hourly,
};

pub use store::{DailyStore, MemoryStore, WriteMode};

/// Emissions of one home over one UTC calendar day, in grams of CO2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub home_id: String,
    /// UTC calendar day; the record covers 00:00 to 24:00 UTC.
    pub date: NaiveDate,
    /// Per-appliance hourly series keyed by appliance key.
    #[serde(default)]
    pub emissions: IndexMap<String, HourlyArray>,
    /// Whole-home hourly series.
    #[serde(default = "zero_hourly")]
    pub total_hourly: HourlyArray,
    #[serde(default)]
    pub summary: Option<Summary>,
}

impl DailyRecord {
    /// Creates a record for the UTC calendar day containing `at`.
    pub fn new(home_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::for_day(home_id, at.date_naive())
    }

    /// Creates an empty record for the given UTC calendar day.
    pub fn for_day(home_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            home_id: home_id.into(),
            date,
            emissions: IndexMap::new(),
            total_hourly: zero_hourly(),
            summary: None,
        }
    }

    /// Wraps a simulator run as a record for `home_id` on `date`.
    pub fn from_simulation(
        home_id: impl Into<String>,
        date: NaiveDate,
        output: SimulationOutput,
    ) -> Self {
        Self {
            home_id: home_id.into(),
            date,
            emissions: output.emissions,
            total_hourly: output.total_hourly,
            summary: Some(output.summary),
        }
    }

    /// Adds or replaces one appliance series.
    pub fn with_series(mut self, key: impl Into<String>, series: HourlyArray) -> Self {
        self.emissions.insert(key.into(), series);
        self
    }

    /// 00:00 UTC of the record's day.
    pub fn date_utc_midnight(&self) -> DateTime<Utc> {
        self.date.and_time(NaiveTime::default()).and_utc()
    }

    /// Checks every appliance series.
    ///
    /// # Errors
    ///
    /// Returns the first malformed series; the whole write must be rejected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (key, series) in &self.emissions {
            validate_hourly(key, series)?;
        }
        Ok(())
    }

    /// Recomputes the whole-home series and the summary from the appliance series.
    ///
    /// Malformed appliance series are left out of the sums instead of
    /// failing. When no well-formed series remains, a previously recorded
    /// top appliance is kept. Running this twice yields the same result.
    pub fn enforce_invariants(&mut self) {
        let mut total_hourly = zero_hourly();
        let mut appliance_totals: Vec<(&str, f64)> = Vec::with_capacity(self.emissions.len());

        for (key, series) in &self.emissions {
            if validate_hourly(key, series).is_err() {
                tracing::debug!(
                    home_id = %self.home_id,
                    date = %self.date,
                    series = %key,
                    "leaving malformed series out of recomputed totals"
                );
                continue;
            }
            for (slot, value) in total_hourly.iter_mut().zip(series) {
                *slot += value;
            }
            appliance_totals.push((key.as_str(), series.iter().sum()));
        }

        for v in &mut total_hourly {
            *v = round2(*v);
        }
        let total_emissions = round2(total_hourly.iter().sum());

        let top_appliance = if appliance_totals.is_empty() {
            self.summary.as_ref().and_then(|s| s.top_appliance.clone())
        } else {
            top_by_total(appliance_totals).map(str::to_string)
        };

        self.total_hourly = total_hourly;
        self.summary = Some(Summary {
            total_emissions,
            top_appliance,
        });
    }

    /// Day total, from the summary or, for legacy records without one, the hourly series.
    pub fn total(&self) -> f64 {
        match &self.summary {
            Some(summary) => summary.total_emissions,
            None => round2(self.total_hourly.iter().filter(|v| v.is_finite()).sum()),
        }
    }

    pub fn top_appliance(&self) -> Option<&str> {
        self.summary.as_ref().and_then(|s| s.top_appliance.as_deref())
    }
}
