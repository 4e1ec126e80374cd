//! Export of invoice records to CSV and XLSX.

mod csv;
mod xlsx;

pub use self::csv::{records_to_csv_string, write_records_csv};
pub use self::xlsx::{
    default_invoice_file_name, invoice_workbook, records_workbook, write_invoice_xlsx,
    write_records_xlsx,
};

use crate::error::ExportError;
use crate::models::record::InvoiceRecord;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// `invoice-<number>.<extension>`, or `invoice-data.<extension>` when the
/// number is blank. Path separators in the number are replaced.
pub fn invoice_file_name(record: &InvoiceRecord, extension: &str) -> String {
    let number = record.invoice_number.trim();
    let stem = if number.is_empty() { "data" } else { number };
    let stem: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect();
    format!("invoice-{stem}.{extension}")
}
