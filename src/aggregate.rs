//! Multi-day rollups and cross-household benchmarks over stored daily records.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EmissionsError;
use crate::record::{DailyRecord, DailyStore};
use crate::sim::types::round2;

/// One calendar day of a [`RangeSeries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeEntry {
    pub date: NaiveDate,
    /// Grams of CO2; zero for days without a record.
    pub total: f64,
    pub top_appliance: Option<String>,
}

/// A home's daily totals over consecutive days, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSeries {
    pub days: u32,
    pub data: Vec<RangeEntry>,
    /// `true` when a record exists for every day in the window.
    pub sufficient: bool,
}

impl RangeSeries {
    /// Sum of the daily totals.
    pub fn total(&self) -> f64 {
        round2(self.data.iter().map(|e| e.total).sum())
    }

    /// Mean daily total over the whole window, missing days counted as zero.
    pub fn average(&self) -> f64 {
        if self.days == 0 {
            return 0.0;
        }
        round2(self.data.iter().map(|e| e.total).sum::<f64>() / f64::from(self.days))
    }
}

/// A home's daily average next to the all-household benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub home_avg: f64,
    pub global_avg: f64,
    pub days: u32,
    /// Reflects only the compared home's record count.
    pub sufficient: bool,
}

impl fmt::Display for RangeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.data {
            writeln!(
                f,
                "{}  {:>10.2} g  top={}",
                e.date,
                e.total,
                e.top_appliance.as_deref().unwrap_or("-")
            )?;
        }
        write!(
            f,
            "{} days: total={:.2} g  avg={:.2} g/day  sufficient={}",
            self.days,
            self.total(),
            self.average(),
            self.sufficient
        )
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "home avg {:.2} g/day vs all homes {:.2} g/day over {} days (sufficient={})",
            self.home_avg, self.global_avg, self.days, self.sufficient
        )
    }
}

/// Longest window a range or comparison query may cover (three years).
pub const MAX_WINDOW_DAYS: u32 = 3 * 366;

/// First day of a `days`-long window ending on `end` (inclusive).
pub fn window_start(days: u32, end: NaiveDate) -> Result<NaiveDate, EmissionsError> {
    if days == 0 {
        return Err(EmissionsError::InvalidDays(days));
    }
    if days > MAX_WINDOW_DAYS {
        return Err(EmissionsError::WindowTooLong {
            days,
            max: MAX_WINDOW_DAYS,
        });
    }
    end.checked_sub_days(Days::new(u64::from(days - 1)))
        .ok_or(EmissionsError::WindowOutOfRange { days, end })
}

/// Read-side queries over a [`DailyStore`]. Never simulates.
pub struct RangeAggregator<'a, S: DailyStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DailyStore + ?Sized> RangeAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Daily totals for `home_id` over the `days` UTC days ending on `end`.
    ///
    /// Days without a record appear with a zero total.
    ///
    /// # Errors
    ///
    /// [`EmissionsError::InvalidDays`] when `days` is zero,
    /// [`EmissionsError::WindowTooLong`] above [`MAX_WINDOW_DAYS`], or any
    /// store error.
    pub fn get_range(
        &self,
        home_id: &str,
        days: u32,
        end: NaiveDate,
    ) -> Result<RangeSeries, EmissionsError> {
        let start = window_start(days, end)?;
        let records = self.store.find_range(home_id, start, end)?;
        let found = records.len();
        let by_date: HashMap<NaiveDate, DailyRecord> =
            records.into_iter().map(|r| (r.date, r)).collect();

        let data = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|date| match by_date.get(&date) {
                Some(r) => RangeEntry {
                    date,
                    total: r.total(),
                    top_appliance: r.top_appliance().map(str::to_string),
                },
                None => RangeEntry {
                    date,
                    total: 0.0,
                    top_appliance: None,
                },
            })
            .collect();

        Ok(RangeSeries {
            days,
            data,
            sufficient: found >= days as usize,
        })
    }

    /// Compares a home's daily average with the all-household benchmark.
    ///
    /// The benchmark averages the homes that reported on each day, then
    /// divides the sum of those per-day figures by `days`, so days with no
    /// records anywhere pull it down while the number of homes does not.
    ///
    /// # Errors
    ///
    /// [`EmissionsError::InvalidDays`] when `days` is zero, or any store error.
    pub fn get_comparison(
        &self,
        home_id: &str,
        days: u32,
        end: NaiveDate,
    ) -> Result<ComparisonResult, EmissionsError> {
        let range = self.get_range(home_id, days, end)?;
        let start = window_start(days, end)?;

        let mut per_day: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
        for record in self.store.find_all_in_range(start, end)? {
            let slot = per_day.entry(record.date).or_insert((0.0, 0));
            slot.0 += record.total();
            slot.1 += 1;
        }
        let benchmark_sum: f64 = per_day
            .values()
            .map(|(sum, homes)| sum / f64::from(*homes))
            .sum();

        Ok(ComparisonResult {
            home_avg: range.average(),
            global_avg: round2(benchmark_sum / f64::from(days)),
            days,
            sufficient: range.sufficient,
        })
    }

    /// The record for `home_id` on the UTC day containing `now`, if any.
    pub fn get_today(
        &self,
        home_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DailyRecord>, EmissionsError> {
        self.store.find(home_id, now.date_naive())
    }
}
