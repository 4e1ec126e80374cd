//! Spreadsheet export.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use super::{Result, invoice_file_name};
use crate::error::ExportError;
use crate::models::record::{InvoiceRecord, RecordField};

/// File name used when none is given: `invoice-<number>.xlsx`.
pub fn default_invoice_file_name(record: &InvoiceRecord) -> String {
    invoice_file_name(record, "xlsx")
}

/// Build a two-column `Field | Value` workbook for a single invoice.
pub fn invoice_workbook(record: &InvoiceRecord, placeholder: &str) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Invoice Data")?;
    sheet.set_column_width(0, 20)?;
    sheet.set_column_width(1, 50)?;

    sheet.write_string_with_format(0, 0, "Field", &header)?;
    sheet.write_string_with_format(0, 1, "Value", &header)?;

    for (i, field) in RecordField::DETAIL_ORDER.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, field.label())?;
        sheet.write_string(row, 1, record.display_field(*field, placeholder))?;
    }

    Ok(workbook)
}

/// Build a workbook with one row per invoice.
pub fn records_workbook(records: &[InvoiceRecord], placeholder: &str) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Invoices")?;

    for (col, field) in RecordField::TABLE_ORDER.iter().enumerate() {
        let col = col as u16;
        let width = match field {
            RecordField::ProviderAddress => 40,
            RecordField::ProviderName | RecordField::ProviderEmail => 30,
            _ => 18,
        };
        sheet.set_column_width(col, width)?;
        sheet.write_string_with_format(0, col, field.label(), &header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, field) in RecordField::TABLE_ORDER.iter().enumerate() {
            sheet.write_string(row, col as u16, record.display_field(*field, placeholder))?;
        }
    }

    Ok(workbook)
}

/// Save a single invoice to an XLSX file.
pub fn write_invoice_xlsx(record: &InvoiceRecord, placeholder: &str, path: &Path) -> Result<()> {
    let mut workbook = invoice_workbook(record, placeholder)?;
    workbook.save(path)?;
    debug!(path = %path.display(), invoice_number = %record.invoice_number, "Wrote invoice workbook");
    Ok(())
}

/// Save all invoices to an XLSX file.
pub fn write_records_xlsx(records: &[InvoiceRecord], placeholder: &str, path: &Path) -> Result<()> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    let mut workbook = records_workbook(records, placeholder)?;
    workbook.save(path)?;
    debug!(path = %path.display(), count = records.len(), "Wrote invoices workbook");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(number: &str) -> InvoiceRecord {
        InvoiceRecord {
            invoice_number: number.to_string(),
            invoice_date: "01.02.2024".to_string(),
            provider_name: "Acme".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(default_invoice_file_name(&record("123")), "invoice-123.xlsx");
        assert_eq!(default_invoice_file_name(&record("FV/1/2024")), "invoice-FV-1-2024.xlsx");
        assert_eq!(default_invoice_file_name(&record("")), "invoice-data.xlsx");
    }

    #[test]
    fn test_invoice_workbook_is_xlsx() {
        let mut workbook = invoice_workbook(&record("123"), "N/A").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_write_records_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.xlsx");

        write_records_xlsx(&[record("1"), record("2")], "N/A", &path).unwrap();
        assert!(path.metadata().unwrap().len() > 0);

        let err = write_records_xlsx(&[], "N/A", &path).unwrap_err();
        assert!(matches!(err, ExportError::Empty));
    }
}
