//! # Sales History Snapshot
//!
//! The session's last-fetched copy of the sale records, plus every sale
//! this session recorded since. Reports are computed from it on demand;
//! nothing derived from it is cached.

use std::sync::{Mutex, PoisonError};
use till_core::SaleRecord;

#[derive(Debug, Default)]
pub struct SalesHistory {
    records: Mutex<Vec<SaleRecord>>,
}

impl SalesHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the records.
    pub fn with_records<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[SaleRecord]) -> R,
    {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        f(&records)
    }

    /// Replaces the snapshot with a fresh fetch.
    pub fn replace(&self, records: Vec<SaleRecord>) {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records;
    }

    /// Appends a sale recorded by this session.
    pub fn push(&self, record: SaleRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    pub fn len(&self) -> usize {
        self.with_records(<[SaleRecord]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
