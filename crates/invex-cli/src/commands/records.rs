//! Record commands - list, show, delete and view stored invoices.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::debug;

use invex_core::export::{invoice_file_name, records_to_csv_string};
use invex_core::models::record::{InvoiceRecord, RecordField};
use invex_core::pdf::{DataUri, PDF_MIME};
use invex_core::store::RecordStore;
use invex_core::view::{group_by_provider, sort_by_date_desc};

use super::{Context, confirm, render};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ListFormat {
    /// Aligned table
    Table,
    /// JSON array
    Json,
    /// CSV with a header row
    Csv,
}

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: ListFormat,

    /// Sort by invoice date, newest first
    #[arg(long)]
    sort_date: bool,

    /// Include stored source PDFs in JSON output
    #[arg(long)]
    include_pdf: bool,
}

/// Natural key of an invoice.
#[derive(Args)]
pub struct KeyArgs {
    /// Invoice number
    pub invoice_number: String,

    /// Invoice date, exactly as stored
    pub invoice_date: String,
}

/// Confirmation flag for destructive commands.
#[derive(Args)]
pub struct ConfirmArgs {
    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,
}

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    #[command(flatten)]
    key: KeyArgs,

    #[command(flatten)]
    confirm: ConfirmArgs,
}

/// Arguments for the delete-provider command.
#[derive(Args)]
pub struct DeleteProviderArgs {
    /// Provider name, exactly as stored
    provider: String,

    #[command(flatten)]
    confirm: ConfirmArgs,
}

/// Arguments for the view command.
#[derive(Args)]
pub struct ViewArgs {
    #[command(flatten)]
    key: KeyArgs,

    /// Output file (default: invoice-<number>.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn list(args: ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut records = ctx.store.read_all();
    if args.sort_date {
        sort_by_date_desc(&mut records);
    }

    match args.format {
        ListFormat::Table => {
            if records.is_empty() {
                println!("No data has been extracted yet. Run 'invex extract' to get started.");
                return Ok(());
            }
            print!(
                "{}",
                render::table(&records, &RecordField::TABLE_ORDER, ctx.placeholder())
            );
            println!();
            println!("{} {} invoice(s)", style("ℹ").blue(), records.len());
        }
        ListFormat::Json => {
            if !args.include_pdf {
                records = records.into_iter().map(InvoiceRecord::without_pdf).collect();
            }
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        ListFormat::Csv => {
            print!("{}", records_to_csv_string(&records, ctx.placeholder())?);
        }
    }

    Ok(())
}

pub fn groups(ctx: &Context) -> anyhow::Result<()> {
    let records = ctx.store.read_all();
    if records.is_empty() {
        println!("No data has been extracted yet. Run 'invex extract' to get started.");
        return Ok(());
    }

    let fields = [
        RecordField::InvoiceNumber,
        RecordField::InvoiceDate,
        RecordField::InvoiceValue,
    ];

    for group in group_by_provider(&records) {
        let provider = if group.provider.trim().is_empty() {
            ctx.placeholder()
        } else {
            group.provider.as_str()
        };
        let first = &group.records[0];

        println!(
            "{} ({} invoice(s))",
            style(provider).bold().cyan(),
            group.records.len()
        );
        println!(
            "  {}",
            [
                first.display_field(RecordField::ProviderAddress, ctx.placeholder()),
                first.display_field(RecordField::ProviderPhone, ctx.placeholder()),
                first.display_field(RecordField::ProviderEmail, ctx.placeholder()),
            ]
            .join(" | ")
        );
        for line in render::table(&group.records, &fields, ctx.placeholder()).lines() {
            println!("    {}", line);
        }
        println!();
    }

    Ok(())
}

pub fn show(args: KeyArgs, ctx: &Context) -> anyhow::Result<()> {
    let record = find(ctx, &args)?;
    print!("{}", render::detail(&record, ctx.placeholder()));
    Ok(())
}

pub fn delete(args: DeleteArgs, ctx: &Context) -> anyhow::Result<()> {
    let key = &args.key;
    let prompt = format!("Delete invoice {} dated {}?", key.invoice_number, key.invoice_date);
    if !confirm(&prompt, args.confirm.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = ctx.store.delete_by_key(&key.invoice_number, &key.invoice_date)?;
    if removed == 0 {
        println!(
            "{} No invoice {} dated {} found",
            style("ℹ").blue(),
            key.invoice_number,
            key.invoice_date
        );
    } else {
        println!(
            "{} Deleted invoice {} dated {}",
            style("✓").green(),
            key.invoice_number,
            key.invoice_date
        );
    }

    report_remaining(ctx);
    Ok(())
}

pub fn delete_provider(args: DeleteProviderArgs, ctx: &Context) -> anyhow::Result<()> {
    let prompt = format!("Delete all invoices from '{}'?", args.provider);
    if !confirm(&prompt, args.confirm.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = ctx.store.delete_by_provider(&args.provider)?;
    println!(
        "{} Deleted {} invoice(s) from '{}'",
        style("✓").green(),
        removed,
        args.provider
    );

    report_remaining(ctx);
    Ok(())
}

pub fn clear(args: ConfirmArgs, ctx: &Context) -> anyhow::Result<()> {
    if !confirm("Delete ALL stored invoices?", args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = ctx.store.delete_all()?;
    println!("{} Deleted {} invoice(s)", style("✓").green(), removed);

    report_remaining(ctx);
    Ok(())
}

pub fn view(args: ViewArgs, ctx: &Context) -> anyhow::Result<()> {
    let record = find(ctx, &args.key)?;

    let Some(uri) = record.pdf_data_uri.as_deref() else {
        anyhow::bail!(
            "Invoice {} has no stored source PDF. Re-extract it with PDF retention enabled.",
            record.key()
        );
    };

    let decoded = DataUri::parse(uri)?;
    if decoded.mime != PDF_MIME {
        debug!("Stored document has MIME type {}", decoded.mime);
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(invoice_file_name(&record, "pdf")));
    fs::write(&output, &decoded.data)?;

    println!(
        "{} Source PDF written to {}",
        style("✓").green(),
        output.display()
    );
    Ok(())
}

fn find(ctx: &Context, key: &KeyArgs) -> anyhow::Result<InvoiceRecord> {
    ctx.store
        .find(&key.invoice_number, &key.invoice_date)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No invoice {} dated {} in {}",
                key.invoice_number,
                key.invoice_date,
                ctx.store.path().display()
            )
        })
}

/// Re-read the store after a mutation.
fn report_remaining(ctx: &Context) {
    let remaining = ctx.store.read_all().len();
    println!("   {} invoice(s) remaining", remaining);
}
