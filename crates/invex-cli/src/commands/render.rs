//! Terminal rendering of invoice records.

use console::style;

use invex_core::models::record::{InvoiceRecord, RecordField};

/// Widest a table cell may get before it is truncated.
const MAX_CELL_WIDTH: usize = 36;

fn truncate(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        value.to_string()
    } else {
        let cut: String = value.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{cut}…")
    }
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    format!("{}{}", value, " ".repeat(width.saturating_sub(len)))
}

/// Render records as an aligned table, one row per record.
pub fn table(records: &[InvoiceRecord], fields: &[RecordField], placeholder: &str) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            fields
                .iter()
                .map(|f| truncate(r.display_field(*f, placeholder)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(f.label().chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();

    let header: Vec<String> = fields
        .iter()
        .zip(&widths)
        .map(|(f, w)| pad(f.label(), *w))
        .collect();
    output.push_str(&style(header.join("  ").trim_end().to_string()).bold().to_string());
    output.push('\n');

    for row in &rows {
        let cells: Vec<String> = row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
        output.push_str(cells.join("  ").trim_end());
        output.push('\n');
    }

    output
}

/// Render one record as `Field  Value` lines.
pub fn detail(record: &InvoiceRecord, placeholder: &str) -> String {
    let width = RecordField::DETAIL_ORDER
        .iter()
        .map(|f| f.label().len())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for field in RecordField::DETAIL_ORDER {
        output.push_str(&format!(
            "{}  {}\n",
            style(pad(field.label(), width)).bold(),
            record.display_field(field, placeholder)
        ));
    }
    if record.pdf_data_uri.is_some() {
        output.push_str(&format!("{}  stored\n", style(pad("Source PDF", width)).bold()));
    }
    output
}
