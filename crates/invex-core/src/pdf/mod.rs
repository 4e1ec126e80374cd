//! PDF intake: validation and data URI encoding.

mod data_uri;
mod intake;

pub use data_uri::DataUri;
pub use intake::PdfInput;

use crate::error::PdfError;

/// MIME type sent to the extraction gateway.
pub const PDF_MIME: &str = "application/pdf";

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;
