//! Error types for the invex-core library.

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// Record store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// PDF intake error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while persisting the invoice collection.
///
/// Read failures never show up here: a collection that cannot be read is
/// treated as empty.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Creating the storage location failed.
    #[error("failed to initialize store at {path}: {source}")]
    Init {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing or replacing the collection file failed.
    #[error("failed to write store at {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The collection could not be serialized.
    #[error("failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A previous writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Errors related to invoice field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The gateway did not answer in time.
    #[error("extraction timed out after {0}s")]
    Timeout(u64),

    /// Transport-level failure talking to the gateway.
    #[error("request failed: {0}")]
    Request(String),

    /// The gateway answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The gateway answered without any content.
    #[error("empty response from model")]
    EmptyResponse,

    /// The gateway answered with content that is not an invoice record.
    #[error("invalid model response: {0}")]
    InvalidResponse(String),

    /// Required configuration (such as an API key) is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// No file in a batch produced a record.
    #[error("no data extracted from {attempted} file(s)")]
    NoData { attempted: usize },
}

/// Errors related to PDF intake.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The input does not start with a PDF signature.
    #[error("not a PDF file")]
    NotPdf,

    /// The input exceeds the configured size limit.
    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    /// Failed to parse the PDF structure.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// A data URI could not be decoded.
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),
}

/// Errors related to spreadsheet and CSV export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Writing the XLSX workbook failed.
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Writing CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Nothing to export.
    #[error("no records to export")]
    Empty,
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
