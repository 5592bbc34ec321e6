//! Storage boundary for daily records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use parking_lot::RwLock;

use super::DailyRecord;
use crate::error::EmissionsError;

/// How a write treats an existing record for the same `(home, date)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the stored record in place.
    Upsert,
    /// Fail with [`EmissionsError::DuplicateRecord`].
    InsertOnly,
}

/// Persistence collaborator holding at most one record per `(home, UTC day)`.
///
/// Implementations must validate and enforce record invariants on every
/// write, and serialize concurrent writes for the same key so that exactly
/// one of them wins.
pub trait DailyStore: Send + Sync {
    /// Fetches the record for `home_id` on `date`.
    fn find(&self, home_id: &str, date: NaiveDate) -> Result<Option<DailyRecord>, EmissionsError>;

    /// Fetches a home's records with `from <= date <= to`, oldest first.
    fn find_range(
        &self,
        home_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyRecord>, EmissionsError>;

    /// Fetches every home's records with `from <= date <= to`.
    fn find_all_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyRecord>, EmissionsError>;

    /// Validates, normalizes and stores `record`, returning the stored copy.
    ///
    /// # Errors
    ///
    /// [`EmissionsError::Validation`] if any series is malformed (nothing is
    /// written), or [`EmissionsError::DuplicateRecord`] for an insert-only
    /// write over an existing record.
    fn write(&self, record: DailyRecord, mode: WriteMode) -> Result<DailyRecord, EmissionsError>;
}

type Key = (String, NaiveDate);

/// Thread-safe in-memory store ordered by home then date.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<Key, DailyRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Snapshot of every stored record, ordered by home then date.
    pub fn all(&self) -> Vec<DailyRecord> {
        self.records.read().values().cloned().collect()
    }
}

impl DailyStore for MemoryStore {
    fn find(&self, home_id: &str, date: NaiveDate) -> Result<Option<DailyRecord>, EmissionsError> {
        Ok(self
            .records
            .read()
            .get(&(home_id.to_string(), date))
            .cloned())
    }

    fn find_range(
        &self,
        home_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyRecord>, EmissionsError> {
        if from > to {
            return Ok(Vec::new());
        }
        let lo = (home_id.to_string(), from);
        let hi = (home_id.to_string(), to);
        Ok(self
            .records
            .read()
            .range(lo..=hi)
            .map(|(_, r)| r.clone())
            .collect())
    }

    fn find_all_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyRecord>, EmissionsError> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|r| r.date >= from && r.date <= to)
            .cloned()
            .collect())
    }

    fn write(
        &self,
        mut record: DailyRecord,
        mode: WriteMode,
    ) -> Result<DailyRecord, EmissionsError> {
        record.validate()?;

        let key = (record.home_id.clone(), record.date);
        let mut records = self.records.write();

        if let Some(existing) = records.get(&key) {
            if mode == WriteMode::InsertOnly {
                return Err(EmissionsError::DuplicateRecord {
                    home_id: key.0,
                    date: key.1,
                });
            }
            // In-place update: carry the stored summary forward so its top
            // appliance survives an update that brings no usable series.
            if record.summary.is_none() {
                record.summary = existing.summary.clone();
            }
        }

        record.enforce_invariants();
        tracing::debug!(
            home_id = %record.home_id,
            date = %record.date,
            total = record.total(),
            "stored daily record"
        );
        records.insert(key, record.clone());
        Ok(record)
    }
}
