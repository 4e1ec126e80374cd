//! Record store backed by a single JSON array file.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::{MergeStats, RecordStore, Result, merge_records};
use crate::error::StoreError;
use crate::models::config::StoreConfig;
use crate::models::record::InvoiceRecord;

/// JSON file record store.
///
/// Every call goes back to disk. Mutations hold the writer lock across the
/// whole read-modify-write cycle and replace the file atomically, so readers
/// only ever see a complete collection. The lock is per instance: share one
/// store between writers in a process. Separate processes are not
/// coordinated.
pub struct JsonRecordStore {
    path: PathBuf,
    pretty: bool,
    writer: Mutex<()>,
}

/// What was found on disk.
enum Loaded {
    Records(Vec<InvoiceRecord>),
    /// Content exists but could not be read as a collection.
    Corrupt,
}

impl Loaded {
    fn into_records(self) -> Vec<InvoiceRecord> {
        match self {
            Loaded::Records(records) => records,
            Loaded::Corrupt => Vec::new(),
        }
    }
}

impl JsonRecordStore {
    /// Create a store over the given file path. Nothing is touched on disk
    /// until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
            writer: Mutex::new(()),
        }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.path.clone()).with_pretty(config.pretty)
    }

    /// Enable or disable pretty-printed output.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Path of the collection file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a single record by its natural key.
    pub fn find(&self, invoice_number: &str, invoice_date: &str) -> Option<InvoiceRecord> {
        self.read_all()
            .into_iter()
            .find(|r| r.has_key(invoice_number, invoice_date))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.writer.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn load(&self) -> Loaded {
        if let Err(e) = self.ensure_initialized() {
            warn!(path = %self.path.display(), error = %e, "Store unavailable, reading as empty");
            return Loaded::Records(Vec::new());
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read store, reading as empty");
                return Loaded::Corrupt;
            }
        };

        if content.trim().is_empty() {
            return Loaded::Records(Vec::new());
        }

        match serde_json::from_str::<Vec<InvoiceRecord>>(&content) {
            Ok(records) => {
                debug!(path = %self.path.display(), count = records.len(), "Loaded collection");
                Loaded::Records(records)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Store content is not a valid collection, reading as empty");
                Loaded::Corrupt
            }
        }
    }

    /// Run a read-modify-write cycle under the writer lock.
    ///
    /// `apply` returns its result and whether the collection changed; the
    /// file is only rewritten on change.
    fn mutate<T>(&self, apply: impl FnOnce(&mut Vec<InvoiceRecord>) -> (T, bool)) -> Result<T> {
        let _guard = self.lock()?;

        let loaded = self.load();
        let corrupt = matches!(loaded, Loaded::Corrupt);
        let mut records = loaded.into_records();

        let (out, changed) = apply(&mut records);
        if changed {
            if corrupt {
                self.quarantine();
            }
            self.persist(&records)?;
        }
        Ok(out)
    }

    /// Keep a copy of unreadable content before it gets overwritten.
    fn quarantine(&self) {
        let mut backup = self.path.clone().into_os_string();
        backup.push(".corrupt");
        let backup = PathBuf::from(backup);

        match fs::copy(&self.path, &backup) {
            Ok(_) => warn!(backup = %backup.display(), "Saved unreadable store content before overwrite"),
            Err(e) => warn!(error = %e, "Could not back up unreadable store content"),
        }
    }

    /// Replace the collection file atomically.
    fn persist(&self, records: &[InvoiceRecord]) -> Result<()> {
        let content = if self.pretty {
            serde_json::to_string_pretty(records)?
        } else {
            serde_json::to_string(records)?
        };

        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(self.parent_dir()).map_err(write_err)?;
        // Temp files are created 0600; keep the mode of the file being replaced
        if let Ok(meta) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(write_err)?;
        }
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(path = %self.path.display(), count = records.len(), "Persisted collection");
        Ok(())
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl RecordStore for JsonRecordStore {
    fn ensure_initialized(&self) -> Result<()> {
        let init_err = |source: std::io::Error| StoreError::Init {
            path: self.path.display().to_string(),
            source,
        };

        fs::create_dir_all(self.parent_dir()).map_err(init_err)?;

        match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(mut file) => {
                file.write_all(b"[]").map_err(init_err)?;
                info!(path = %self.path.display(), "Created empty invoice store");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(init_err(e)),
        }
    }

    fn read_all(&self) -> Vec<InvoiceRecord> {
        self.load().into_records()
    }

    fn append(&self, records: Vec<InvoiceRecord>) -> Result<MergeStats> {
        if records.is_empty() {
            return Ok(MergeStats::default());
        }

        let stats = self.mutate(|current| {
            let (merged, stats) = merge_records(std::mem::take(current), records);
            *current = merged;
            (stats, true)
        })?;

        info!(added = stats.added, updated = stats.updated, "Merged records into store");
        Ok(stats)
    }

    fn delete_by_key(&self, invoice_number: &str, invoice_date: &str) -> Result<usize> {
        let removed = self.mutate(|current| {
            let before = current.len();
            current.retain(|r| !r.has_key(invoice_number, invoice_date));
            let removed = before - current.len();
            (removed, removed > 0)
        })?;

        debug!(invoice_number, invoice_date, removed, "Delete by key");
        Ok(removed)
    }

    fn delete_by_provider(&self, provider_name: &str) -> Result<usize> {
        let removed = self.mutate(|current| {
            let before = current.len();
            current.retain(|r| r.provider_name != provider_name);
            let removed = before - current.len();
            (removed, removed > 0)
        })?;

        debug!(provider_name, removed, "Delete by provider");
        Ok(removed)
    }

    fn delete_all(&self) -> Result<usize> {
        let removed = self.mutate(|current| {
            let removed = current.len();
            current.clear();
            // Always rewrite so unreadable content is reset too.
            (removed, true)
        })?;

        info!(removed, "Cleared store");
        Ok(removed)
    }
}
