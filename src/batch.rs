//! Multi-home simulation drivers.
//!
//! Each `(home, day)` pair is an independent item run on the rayon pool.
//! Items own their random generator, seeded from the batch seed and the
//! item's position, so a batch is reproducible regardless of scheduling.
//! A failing item is logged and tallied; it never aborts the batch.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::config::HomeConfig;
use crate::error::EmissionsError;
use crate::factor::EmissionFactorSource;
use crate::record::{DailyRecord, DailyStore, WriteMode};
use crate::sim::{EmissionSimulator, SimulationRequest};

/// Spacing between per-item seeds.
const ITEM_SEED_STRIDE: u64 = 7919;

/// One item that could not be simulated or stored.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub home_id: String,
    pub date: NaiveDate,
    pub error: EmissionsError,
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}: {}", self.home_id, self.date, self.error)
    }
}

/// Per-item tally of a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Failures in item order.
    pub failures: Vec<BatchFailure>,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} skipped={} failed={}",
            self.created, self.skipped, self.failed
        )
    }
}

enum Outcome {
    Created,
    Skipped,
    Failed(BatchFailure),
}

/// Shared collaborators for a batch run.
pub struct BatchRunner<'a> {
    simulator: &'a EmissionSimulator,
    factors: &'a dyn EmissionFactorSource,
    store: &'a dyn DailyStore,
    seed: u64,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        simulator: &'a EmissionSimulator,
        factors: &'a dyn EmissionFactorSource,
        store: &'a dyn DailyStore,
        seed: u64,
    ) -> Self {
        Self {
            simulator,
            factors,
            store,
            seed,
        }
    }

    /// Simulates `date` for every home, replacing any stored record.
    pub fn simulate_all(&self, homes: &[HomeConfig], date: NaiveDate) -> BatchReport {
        let items: Vec<(&HomeConfig, NaiveDate)> = homes.iter().map(|h| (h, date)).collect();
        self.run(&items, WriteMode::Upsert)
    }

    /// Simulates every day in `from..=to` for every home.
    ///
    /// Days that already have a record are skipped unless `overwrite` is set.
    /// An inverted range is an empty batch.
    pub fn backfill(
        &self,
        homes: &[HomeConfig],
        from: NaiveDate,
        to: NaiveDate,
        overwrite: bool,
    ) -> BatchReport {
        let items: Vec<(&HomeConfig, NaiveDate)> = homes
            .iter()
            .flat_map(|h| from.iter_days().take_while(move |d| *d <= to).map(move |d| (h, d)))
            .collect();
        let mode = if overwrite {
            WriteMode::Upsert
        } else {
            WriteMode::InsertOnly
        };
        self.run(&items, mode)
    }

    fn run(&self, items: &[(&HomeConfig, NaiveDate)], mode: WriteMode) -> BatchReport {
        let outcomes: Vec<Outcome> = items
            .par_iter()
            .enumerate()
            .map(|(index, (home, date))| self.run_item(index, home, *date, mode))
            .collect();

        let mut report = BatchReport::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Created => report.created += 1,
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed(failure) => {
                    report.failed += 1;
                    report.failures.push(failure);
                }
            }
        }
        tracing::info!(
            items = items.len(),
            created = report.created,
            skipped = report.skipped,
            failed = report.failed,
            "batch finished"
        );
        report
    }

    fn run_item(&self, index: usize, home: &HomeConfig, date: NaiveDate, mode: WriteMode) -> Outcome {
        let fail = |error: EmissionsError| {
            tracing::warn!(home_id = %home.id, %date, %error, "batch item failed");
            Outcome::Failed(BatchFailure {
                home_id: home.id.clone(),
                date,
                error,
            })
        };

        let appliances = home.inventory();
        if appliances.is_idle() {
            tracing::debug!(home_id = %home.id, %date, "no simulatable appliances");
            return Outcome::Skipped;
        }

        if mode == WriteMode::InsertOnly {
            match self.store.find(&home.id, date) {
                Ok(Some(_)) => return Outcome::Skipped,
                Ok(None) => {}
                Err(e) => return fail(e),
            }
        }

        let factor = match self
            .factors
            .factor_for(home.emission_factor, home.country_code.as_deref())
        {
            Ok(f) => f,
            Err(e) => return fail(e),
        };

        let request = SimulationRequest {
            appliances,
            country_code: home.country_code.clone(),
            date: Some(date.and_time(NaiveTime::default()).and_utc()),
            emission_factor_kg_per_kwh: factor,
        };
        let mut rng = StdRng::seed_from_u64(
            self.seed
                .wrapping_add((index as u64).wrapping_mul(ITEM_SEED_STRIDE)),
        );
        let output = self.simulator.simulate(&mut rng, &request);

        match self
            .store
            .write(DailyRecord::from_simulation(&home.id, date, output), mode)
        {
            Ok(_) => Outcome::Created,
            // Lost a race with another writer for the same key.
            Err(EmissionsError::DuplicateRecord { .. }) => Outcome::Skipped,
            Err(e) => fail(e),
        }
    }
}
