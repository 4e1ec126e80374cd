//! Core library for invoice data extraction.
//!
//! This crate provides:
//! - A JSON-backed invoice record store with key-based merge semantics
//! - PDF intake (validation and data URI encoding)
//! - An extraction gateway abstraction over hosted LLMs, with batch ingestion
//! - Presentation helpers (grouping by provider, date sorting) and export

pub mod error;
pub mod export;
pub mod extraction;
pub mod models;
pub mod pdf;
pub mod store;
pub mod view;

pub use error::{InvexError, Result};
pub use extraction::{BatchReport, ExtractionGateway, FileFailure, ingest};
#[cfg(feature = "remote")]
pub use extraction::GeminiGateway;
pub use models::config::InvexConfig;
pub use models::record::{InvoiceRecord, RecordKey};
pub use pdf::{DataUri, PdfInput};
pub use store::JsonRecordStore;
pub use view::{ProviderGroup, group_by_provider, sort_by_date_desc};
