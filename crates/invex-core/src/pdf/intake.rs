//! Validation of uploaded PDF files.

use std::path::Path;

use lopdf::Document;
use tracing::debug;

use super::{DataUri, PDF_MIME, Result};
use crate::error::PdfError;

/// PDF signature; readers accept it anywhere in the first kilobyte.
const PDF_SIGNATURE: &[u8] = b"%PDF-";
const SIGNATURE_WINDOW: usize = 1024;

/// A PDF that passed intake checks and is ready for extraction.
#[derive(Debug, Clone)]
pub struct PdfInput {
    /// Display name, usually the file name.
    pub name: String,
    /// Raw file content.
    pub data: Vec<u8>,
    /// Number of pages.
    pub page_count: u32,
}

impl PdfInput {
    /// Validate raw bytes as a PDF no larger than `max_size`.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>, max_size: usize) -> Result<Self> {
        let name = name.into();

        if data.len() > max_size {
            return Err(PdfError::TooLarge {
                size: data.len(),
                limit: max_size,
            });
        }

        let window = &data[..data.len().min(SIGNATURE_WINDOW)];
        if !window.windows(PDF_SIGNATURE.len()).any(|w| w == PDF_SIGNATURE) {
            return Err(PdfError::NotPdf);
        }

        let mut doc = Document::load_mem(&data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Empty-password encryption is common and harmless.
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!(name = %name, "PDF uses empty-password encryption");
        }

        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!(name = %name, pages = page_count, bytes = data.len(), "Accepted PDF");
        Ok(Self {
            name,
            data,
            page_count,
        })
    }

    /// Read and validate a PDF file.
    pub fn from_path(path: &Path, max_size: usize) -> crate::Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document.pdf")
            .to_string();
        Ok(Self::from_bytes(name, data, max_size)?)
    }

    /// Encode as `data:application/pdf;base64,...`.
    pub fn to_data_uri(&self) -> String {
        DataUri::encode(PDF_MIME, &self.data)
    }
}
