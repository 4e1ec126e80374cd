//! Export command - write stored invoices to CSV or XLSX.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use invex_core::export::{
    invoice_file_name, write_invoice_xlsx, write_records_csv, write_records_xlsx,
};
use invex_core::store::RecordStore;
use invex_core::view::sort_by_date_desc;

use super::Context;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated values
    Csv,
    /// Excel workbook
    Xlsx,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "xlsx")]
    format: ExportFormat,

    /// Output file (default: invoices.<ext>, or invoice-<number>.<ext> for one invoice)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export only the invoice with this number
    #[arg(long, requires = "date")]
    invoice: Option<String>,

    /// Invoice date of the single invoice to export
    #[arg(long, requires = "invoice")]
    date: Option<String>,

    /// Sort by invoice date, newest first
    #[arg(long)]
    sort_date: bool,
}

pub fn run(args: ExportArgs, ctx: &Context) -> anyhow::Result<()> {
    let placeholder = ctx.placeholder();

    let (records, default_name) = match (&args.invoice, &args.date) {
        (Some(number), Some(date)) => {
            let record = ctx.store.find(number, date).ok_or_else(|| {
                anyhow::anyhow!("No invoice {} dated {} in {}", number, date, ctx.store.path().display())
            })?;
            let name = invoice_file_name(&record, args.format.extension());
            (vec![record], name)
        }
        _ => {
            let mut records = ctx.store.read_all();
            if args.sort_date {
                sort_by_date_desc(&mut records);
            }
            (records, format!("invoices.{}", args.format.extension()))
        }
    };

    if records.is_empty() {
        anyhow::bail!("No data has been extracted yet. Nothing to export.");
    }

    let output = args.output.unwrap_or_else(|| PathBuf::from(default_name));

    match args.format {
        ExportFormat::Csv => {
            let writer = BufWriter::new(File::create(&output)?);
            write_records_csv(&records, placeholder, writer)?;
        }
        ExportFormat::Xlsx if args.invoice.is_some() => {
            write_invoice_xlsx(&records[0], placeholder, &output)?;
        }
        ExportFormat::Xlsx => {
            write_records_xlsx(&records, placeholder, &output)?;
        }
    }

    info!(count = records.len(), path = %output.display(), "Export finished");
    println!(
        "{} Exported {} invoice(s) to {}",
        style("✓").green(),
        records.len(),
        output.display()
    );

    Ok(())
}
