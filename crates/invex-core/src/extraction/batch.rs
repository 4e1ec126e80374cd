//! Batch extraction and ingestion into the record store.

use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::ExtractionGateway;
use crate::error::{ExtractionError, InvexError};
use crate::models::config::ExtractionConfig;
use crate::models::record::InvoiceRecord;
use crate::pdf::PdfInput;
use crate::store::{MergeStats, RecordStore};

/// Options controlling a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Timeout applied to each gateway call.
    pub timeout: Duration,
    /// Maximum number of gateway calls in flight.
    pub max_concurrency: usize,
    /// Attach the source PDF to each record as a data URI.
    pub retain_pdf: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

impl From<&ExtractionConfig> for BatchOptions {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_concurrency: config.max_concurrency,
            retain_pdf: config.retain_pdf,
        }
    }
}

/// A file that produced no record.
#[derive(Debug)]
pub struct FileFailure {
    /// File name.
    pub name: String,
    /// Why extraction failed.
    pub error: ExtractionError,
}

/// Outcome of an ingested batch.
#[derive(Debug)]
pub struct BatchReport {
    /// Number of files submitted.
    pub attempted: usize,
    /// Records handed to the store, in submission order.
    pub records: Vec<InvoiceRecord>,
    /// Files that failed, in submission order.
    pub failures: Vec<FileFailure>,
    /// What the merge did.
    pub merge: MergeStats,
    /// Wall-clock time of the batch in milliseconds.
    pub processing_time_ms: u64,
}

impl BatchReport {
    /// Number of files that produced a record.
    pub fn succeeded(&self) -> usize {
        self.records.len()
    }

    /// Some but not all files failed.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty() && !self.records.is_empty()
    }

    /// Short summary such as `2 of 3 files processed`.
    pub fn summary(&self) -> String {
        format!("{} of {} files processed", self.succeeded(), self.attempted)
    }
}

/// Run the gateway over every input concurrently.
///
/// Returns successful records and failures, both in input order regardless
/// of completion order. A call that exceeds the timeout counts as a failure.
pub async fn extract_batch<G>(
    gateway: &G,
    inputs: &[PdfInput],
    options: &BatchOptions,
) -> (Vec<InvoiceRecord>, Vec<FileFailure>)
where
    G: ExtractionGateway + ?Sized,
{
    let concurrency = options.max_concurrency.max(1);

    let mut outcomes: Vec<(usize, Result<InvoiceRecord, ExtractionError>)> =
        stream::iter(inputs.iter().enumerate())
            .map(|(idx, pdf)| async move { (idx, extract_one(gateway, pdf, options).await) })
            .buffer_unordered(concurrency)
            .collect()
            .await;

    outcomes.sort_by_key(|(idx, _)| *idx);

    let mut records = Vec::new();
    let mut failures = Vec::new();
    for (idx, outcome) in outcomes {
        let name = &inputs[idx].name;
        match outcome {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!(file = %name, gateway = gateway.name(), error = %error, "Extraction failed");
                failures.push(FileFailure {
                    name: name.clone(),
                    error,
                });
            }
        }
    }

    (records, failures)
}

async fn extract_one<G>(
    gateway: &G,
    pdf: &PdfInput,
    options: &BatchOptions,
) -> Result<InvoiceRecord, ExtractionError>
where
    G: ExtractionGateway + ?Sized,
{
    let start = Instant::now();

    let mut record = match tokio::time::timeout(options.timeout, gateway.extract(pdf)).await {
        Ok(result) => result?,
        Err(_) => return Err(ExtractionError::Timeout(options.timeout.as_secs())),
    };

    if record.is_blank() {
        return Err(ExtractionError::InvalidResponse(
            "no invoice fields in response".to_string(),
        ));
    }

    if options.retain_pdf {
        record.pdf_data_uri = Some(pdf.to_data_uri());
    }

    debug!(
        file = %pdf.name,
        invoice_number = %record.invoice_number,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Extracted invoice"
    );
    Ok(record)
}

/// Extract a batch and merge the successful records into the store.
///
/// Fails with [`ExtractionError::NoData`] without touching the store when
/// no file produced a record.
pub async fn ingest<G, S>(
    gateway: &G,
    store: &S,
    inputs: &[PdfInput],
    options: &BatchOptions,
) -> crate::Result<BatchReport>
where
    G: ExtractionGateway + ?Sized,
    S: RecordStore + ?Sized,
{
    let start = Instant::now();
    let attempted = inputs.len();

    let (records, failures) = extract_batch(gateway, inputs, options).await;

    if records.is_empty() {
        warn!(attempted, "No data extracted from batch");
        return Err(InvexError::Extraction(ExtractionError::NoData { attempted }));
    }

    let merge = store.append(records.clone())?;

    let report = BatchReport {
        attempted,
        records,
        failures,
        merge,
        processing_time_ms: start.elapsed().as_millis() as u64,
    };

    if report.is_partial() {
        warn!(
            succeeded = report.succeeded(),
            attempted,
            "Partial extraction"
        );
    }
    info!(
        succeeded = report.succeeded(),
        attempted,
        added = merge.added,
        updated = merge.updated,
        elapsed_ms = report.processing_time_ms,
        "Batch ingested"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::sample_pdf;
    use crate::store::JsonRecordStore;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    /// Gateway answering from the file name: `fail-*` errors, `slow-*` hangs,
    /// `blank-*` returns no fields, anything else becomes invoice number.
    struct FakeGateway {
        failing: HashSet<String>,
    }

    impl FakeGateway {
        fn new() -> Self {
            Self {
                failing: HashSet::new(),
            }
        }

        fn failing(names: &[&str]) -> Self {
            Self {
                failing: names.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl ExtractionGateway for FakeGateway {
        async fn extract(&self, pdf: &PdfInput) -> super::super::Result<InvoiceRecord> {
            if self.failing.contains(&pdf.name) || pdf.name.starts_with("fail-") {
                return Err(ExtractionError::Api {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            if pdf.name.starts_with("slow-") {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }
            if pdf.name.starts_with("blank-") {
                return Ok(InvoiceRecord::default());
            }
            Ok(InvoiceRecord {
                invoice_number: pdf.name.trim_end_matches(".pdf").to_string(),
                invoice_date: "01.02.2024".to_string(),
                provider_name: "Acme".to_string(),
                ..Default::default()
            })
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn input(name: &str) -> PdfInput {
        PdfInput::from_bytes(name, sample_pdf(1), 1 << 20).unwrap()
    }

    fn options() -> BatchOptions {
        BatchOptions {
            timeout: Duration::from_secs(5),
            max_concurrency: 4,
            retain_pdf: false,
        }
    }

    fn temp_store() -> (tempfile::TempDir, JsonRecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonRecordStore::new(dir.path().join("invoices.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let inputs: Vec<_> = ["c.pdf", "a.pdf", "b.pdf"].iter().map(|n| input(n)).collect();

        let (records, failures) = extract_batch(&FakeGateway::new(), &inputs, &options()).await;

        let numbers: Vec<&str> = records.iter().map(|r| r.invoice_number.as_str()).collect();
        assert_eq!(numbers, vec!["c", "a", "b"]);
        assert!(failures.is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_appends_successes() {
        let (_dir, store) = temp_store();
        let inputs = vec![input("1.pdf"), input("2.pdf"), input("3.pdf")];
        let gateway = FakeGateway::failing(&["2.pdf"]);

        let report = ingest(&gateway, &store, &inputs, &options()).await.unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.attempted, 3);
        assert!(report.is_partial());
        assert_eq!(report.summary(), "2 of 3 files processed");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "2.pdf");

        let stored: Vec<String> = store.read_all().into_iter().map(|r| r.invoice_number).collect();
        assert_eq!(stored, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_total_failure_leaves_store_untouched() {
        let (_dir, store) = temp_store();
        store
            .append(vec![InvoiceRecord {
                invoice_number: "existing".to_string(),
                ..Default::default()
            }])
            .unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        let inputs = vec![input("fail-1.pdf"), input("fail-2.pdf"), input("fail-3.pdf")];
        let err = ingest(&FakeGateway::new(), &store, &inputs, &options())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InvexError::Extraction(ExtractionError::NoData { attempted: 3 })
        ));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_timeout_is_a_file_failure() {
        let inputs = vec![input("slow-1.pdf"), input("ok.pdf")];
        let opts = BatchOptions {
            timeout: Duration::from_millis(50),
            ..options()
        };

        let (records, failures) = extract_batch(&FakeGateway::new(), &inputs, &opts).await;

        assert_eq!(records.len(), 1);
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0].error, ExtractionError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_blank_result_is_a_failure() {
        let inputs = vec![input("blank-1.pdf")];

        let (records, failures) = extract_batch(&FakeGateway::new(), &inputs, &options()).await;

        assert!(records.is_empty());
        assert!(matches!(failures[0].error, ExtractionError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_retain_pdf_attaches_data_uri() {
        let inputs = vec![input("1.pdf")];
        let opts = BatchOptions {
            retain_pdf: true,
            ..options()
        };

        let (records, _) = extract_batch(&FakeGateway::new(), &inputs, &opts).await;

        let uri = records[0].pdf_data_uri.as_deref().unwrap();
        assert!(uri.starts_with("data:application/pdf;base64,"));
    }

    #[tokio::test]
    async fn test_reprocessing_same_file_does_not_duplicate() {
        let (_dir, store) = temp_store();
        let inputs = vec![input("1.pdf")];

        ingest(&FakeGateway::new(), &store, &inputs, &options()).await.unwrap();
        let report = ingest(&FakeGateway::new(), &store, &inputs, &options()).await.unwrap();

        assert_eq!(report.merge, MergeStats { added: 0, updated: 1 });
        assert_eq!(store.read_all().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_is_no_data() {
        let (_dir, store) = temp_store();

        let err = ingest(&FakeGateway::new(), &store, &[], &options())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InvexError::Extraction(ExtractionError::NoData { attempted: 0 })
        ));
    }
}
