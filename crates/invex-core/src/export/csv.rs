//! CSV export of the whole collection.

use std::io::Write;

use super::Result;
use crate::error::ExportError;
use crate::models::record::{InvoiceRecord, RecordField};

/// Write records as CSV in table column order, blanks replaced by `placeholder`.
pub fn write_records_csv<W: Write>(
    records: &[InvoiceRecord],
    placeholder: &str,
    writer: W,
) -> Result<()> {
    let mut wtr = ::csv::Writer::from_writer(writer);

    wtr.write_record(RecordField::TABLE_ORDER.iter().map(|f| f.label()))?;

    for record in records {
        wtr.write_record(
            RecordField::TABLE_ORDER
                .iter()
                .map(|f| record.display_field(*f, placeholder)),
        )?;
    }

    wtr.flush().map_err(|e| ExportError::Csv(e.into()))?;
    Ok(())
}

/// Render records as a CSV string.
pub fn records_to_csv_string(records: &[InvoiceRecord], placeholder: &str) -> Result<String> {
    let mut buf = Vec::new();
    write_records_csv(records, placeholder, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
