//! CLI application for extracting, storing and exporting invoice data.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{Context, config, export, extract, records};

/// Invoice extraction - pull structured data out of PDF invoices
#[derive(Parser)]
#[command(name = "invex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the invoice store (overrides config)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract invoice data from PDF files and save it
    Extract(extract::ExtractArgs),

    /// List stored invoices
    List(records::ListArgs),

    /// Show stored invoices grouped by provider
    Groups,

    /// Show a single stored invoice
    Show(records::KeyArgs),

    /// Delete a single invoice
    Delete(records::DeleteArgs),

    /// Delete all invoices from a provider
    DeleteProvider(records::DeleteProviderArgs),

    /// Delete all stored invoices
    Clear(records::ConfirmArgs),

    /// Write the stored source PDF of an invoice to a file
    View(records::ViewArgs),

    /// Export invoices to CSV or XLSX
    Export(export::ExportArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Config management works without a loadable config
    let command = match cli.command {
        Commands::Config(args) => return config::run(args).await,
        command => command,
    };

    let ctx = Context::load(cli.config.as_deref(), cli.store)?;

    match command {
        Commands::Extract(args) => extract::run(args, &ctx).await,
        Commands::List(args) => records::list(args, &ctx),
        Commands::Groups => records::groups(&ctx),
        Commands::Show(args) => records::show(args, &ctx),
        Commands::Delete(args) => records::delete(args, &ctx),
        Commands::DeleteProvider(args) => records::delete_provider(args, &ctx),
        Commands::Clear(args) => records::clear(args, &ctx),
        Commands::View(args) => records::view(args, &ctx),
        Commands::Export(args) => export::run(args, &ctx),
        Commands::Config(_) => unreachable!("handled above"),
    }
}
