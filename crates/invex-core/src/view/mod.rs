//! Derived, read-only views over the collection.
//!
//! Nothing here is persisted; every view is recomputed from `read_all()`.

mod dates;

pub use dates::{parse_invoice_date, sort_by_date_desc};

use crate::models::record::InvoiceRecord;

/// Records sharing one provider name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderGroup {
    /// Exact provider name (may be empty).
    pub provider: String,
    /// Records in collection order.
    pub records: Vec<InvoiceRecord>,
}

/// Group records by exact provider name, in order of first appearance.
pub fn group_by_provider(records: &[InvoiceRecord]) -> Vec<ProviderGroup> {
    let mut groups: Vec<ProviderGroup> = Vec::new();

    for record in records {
        match groups.iter_mut().find(|g| g.provider == record.provider_name) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(ProviderGroup {
                provider: record.provider_name.clone(),
                records: vec![record.clone()],
            }),
        }
    }

    groups
}
