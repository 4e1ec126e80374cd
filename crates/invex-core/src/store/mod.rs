//! Invoice record store.
//!
//! The collection is a single ordered list of records. Records are merged
//! on their natural key `(invoice_number, invoice_date)`: a later write for
//! the same key replaces the earlier record in place, anything else is
//! appended at the tail.

mod json;

pub use json::JsonRecordStore;

use std::collections::HashMap;

use crate::error::StoreError;
use crate::models::record::{InvoiceRecord, RecordKey};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Trait for invoice record stores.
pub trait RecordStore: Send + Sync {
    /// Create the backing storage with an empty collection if it is missing.
    fn ensure_initialized(&self) -> Result<()>;

    /// Read the whole collection in stored order. Never fails; unreadable
    /// storage reads as empty.
    fn read_all(&self) -> Vec<InvoiceRecord>;

    /// Merge records into the collection by natural key.
    fn append(&self, records: Vec<InvoiceRecord>) -> Result<MergeStats>;

    /// Remove the record with the given key. Returns how many were removed.
    fn delete_by_key(&self, invoice_number: &str, invoice_date: &str) -> Result<usize>;

    /// Remove every record from the given provider. Returns how many were removed.
    fn delete_by_provider(&self, provider_name: &str) -> Result<usize>;

    /// Empty the collection. Returns how many records were removed.
    fn delete_all(&self) -> Result<usize>;
}

/// Outcome of a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records appended under a new key.
    pub added: usize,
    /// Records that replaced an existing one with the same key.
    pub updated: usize,
}

impl MergeStats {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.updated == 0
    }
}

/// Merge `incoming` into `existing` by natural key.
///
/// A replaced record keeps its original position. New keys go to the tail in
/// input order. Duplicate keys already present in `existing` collapse onto
/// the first position, carrying the last value.
pub fn merge_records(
    existing: Vec<InvoiceRecord>,
    incoming: Vec<InvoiceRecord>,
) -> (Vec<InvoiceRecord>, MergeStats) {
    let mut merged: Vec<InvoiceRecord> = Vec::with_capacity(existing.len() + incoming.len());
    let mut index: HashMap<RecordKey, usize> = HashMap::with_capacity(merged.capacity());

    for record in existing {
        upsert(&mut merged, &mut index, record);
    }

    let mut stats = MergeStats::default();
    for record in incoming {
        if upsert(&mut merged, &mut index, record) {
            stats.updated += 1;
        } else {
            stats.added += 1;
        }
    }

    (merged, stats)
}

/// Insert or replace; returns true when an existing record was replaced.
fn upsert(
    merged: &mut Vec<InvoiceRecord>,
    index: &mut HashMap<RecordKey, usize>,
    record: InvoiceRecord,
) -> bool {
    let key = record.key();
    if let Some(&pos) = index.get(&key) {
        merged[pos] = record;
        return true;
    }
    index.insert(key, merged.len());
    merged.push(record);
    false
}
