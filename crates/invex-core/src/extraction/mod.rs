//! Invoice extraction through an external gateway.
//!
//! The gateway turns one PDF into one [`InvoiceRecord`] or fails. Batches
//! call it once per file, concurrently, and only successful results reach
//! the store.

mod batch;
#[cfg(feature = "remote")]
mod gemini;
mod response;

pub use batch::{BatchOptions, BatchReport, FileFailure, extract_batch, ingest};
#[cfg(feature = "remote")]
pub use gemini::GeminiGateway;
pub use response::parse_model_output;

use async_trait::async_trait;

use crate::error::ExtractionError;
use crate::models::record::InvoiceRecord;
use crate::pdf::PdfInput;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// An external capability that extracts invoice fields from a PDF.
///
/// Implementations must not share mutable state between calls; a batch runs
/// several calls at once.
#[async_trait]
pub trait ExtractionGateway: Send + Sync {
    /// Extract invoice fields from a single PDF.
    async fn extract(&self, pdf: &PdfInput) -> Result<InvoiceRecord>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "gateway"
    }
}
