//! Store — persistence sink for canonical reports.
//!
//! A sink accepts finished [`CanonicalReport`]s and assigns each one a
//! sequence id and a creation timestamp. Reports are never updated or
//! deleted. Two sinks ship: [`MemoryStore`] and the append-only
//! [`JsonlStore`].

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::types::{CanonicalReport, Identity};

/// A report as persisted: the canonical record plus storage identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: CanonicalReport,
}

/// Listing projection used by the public report index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: u64,
    pub report_title: String,
    pub battle_time: String,
    pub system_name: String,
    pub created_by: Option<Identity>,
    pub created_at: DateTime<Utc>,
}

impl From<&StoredReport> for ReportSummary {
    fn from(stored: &StoredReport) -> Self {
        Self {
            id: stored.id,
            report_title: stored.report.report_title.clone(),
            battle_time: stored.report.battle_time.clone(),
            system_name: stored.report.system_name.clone(),
            created_by: stored.report.created_by.clone(),
            created_at: stored.created_at,
        }
    }
}

/// Insert-only persistence for finished reports.
pub trait ReportSink: Send + Sync {
    /// Persist `report`, assigning it the next id and the current time.
    fn insert(&self, report: CanonicalReport) -> Result<StoredReport, StoreError>;

    /// Summaries of every stored report, newest first.
    fn list(&self) -> Result<Vec<ReportSummary>, StoreError>;

    fn get(&self, id: u64) -> Result<Option<StoredReport>, StoreError>;
}

impl<S: ReportSink + ?Sized> ReportSink for Arc<S> {
    fn insert(&self, report: CanonicalReport) -> Result<StoredReport, StoreError> {
        (**self).insert(report)
    }

    fn list(&self) -> Result<Vec<ReportSummary>, StoreError> {
        (**self).list()
    }

    fn get(&self, id: u64) -> Result<Option<StoredReport>, StoreError> {
        (**self).get(id)
    }
}

fn summaries_newest_first(records: &[StoredReport]) -> Vec<ReportSummary> {
    let mut out: Vec<ReportSummary> = records.iter().map(ReportSummary::from).collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    out
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process store. Contents are lost when dropped.
pub struct MemoryStore {
    records: Mutex<Vec<StoredReport>>,
    clock: Box<dyn Clock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            clock: Box::new(clock),
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for MemoryStore {
    fn insert(&self, report: CanonicalReport) -> Result<StoredReport, StoreError> {
        let mut records = lock(&self.records);
        let stored = StoredReport {
            id: records.last().map_or(1, |r| r.id + 1),
            created_at: self.clock.now(),
            report,
        };
        records.push(stored.clone());
        tracing::info!(id = stored.id, title = %stored.report.report_title, "report stored");
        Ok(stored)
    }

    fn list(&self) -> Result<Vec<ReportSummary>, StoreError> {
        Ok(summaries_newest_first(&lock(&self.records)))
    }

    fn get(&self, id: u64) -> Result<Option<StoredReport>, StoreError> {
        Ok(lock(&self.records).iter().find(|r| r.id == id).cloned())
    }
}

// ---------------------------------------------------------------------------
// JsonlStore
// ---------------------------------------------------------------------------

/// Append-only JSON-lines file, one [`StoredReport`] per line.
///
/// The next id is recovered from the file on open, so ids keep increasing
/// across restarts.
pub struct JsonlStore {
    path: PathBuf,
    next_id: Mutex<u64>,
    clock: Box<dyn Clock>,
}

impl JsonlStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_clock(path, SystemClock)
    }

    pub fn open_with_clock(
        path: impl Into<PathBuf>,
        clock: impl Clock + 'static,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let last = read_all(&path)?.iter().map(|r| r.id).max().unwrap_or(0);
        tracing::debug!(path = %path.display(), last_id = last, "opened report store");
        Ok(Self {
            path,
            next_id: Mutex::new(last + 1),
            clock: Box::new(clock),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonlStore {
    fn insert(&self, report: CanonicalReport) -> Result<StoredReport, StoreError> {
        let mut next_id = lock(&self.next_id);
        let stored = StoredReport {
            id: *next_id,
            created_at: self.clock.now(),
            report,
        };
        let mut line = serde_json::to_string(&stored)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        *next_id += 1;
        tracing::info!(id = stored.id, path = %self.path.display(), "report stored");
        Ok(stored)
    }

    fn list(&self) -> Result<Vec<ReportSummary>, StoreError> {
        let _guard = lock(&self.next_id);
        Ok(summaries_newest_first(&read_all(&self.path)?))
    }

    fn get(&self, id: u64) -> Result<Option<StoredReport>, StoreError> {
        let _guard = lock(&self.next_id);
        Ok(read_all(&self.path)?.into_iter().find(|r| r.id == id))
    }
}

fn read_all(path: &Path) -> Result<Vec<StoredReport>, StoreError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| StoreError::Corrupt {
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// A poisoned lock only means another insert panicked mid-way; the data
/// behind it is still a valid `Vec`/counter.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
