// Storage module: persisted aligned table, change audit log and fetch log.

pub mod sqlite;

pub use sqlite::SqliteStorage;

use crate::model::{AlignedRow, AlignedTable, ChangeRecord, Commodity, LatestPrice, SeriesSummary, StorageError};
use chrono::{DateTime, Utc};

/// Outcome of one upstream fetch, kept for operational history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Success,
    Failed,
}

impl FetchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchStatus::Success => "success",
            FetchStatus::Failed => "failed",
        }
    }
}

/// A change record as read back from the audit log.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredChange {
    pub id: i64,
    pub record: ChangeRecord,
    pub created_at: DateTime<Utc>,
}

/// Repository injected into the pipeline. The aligned table is written as
/// `(commodity, date)` upserts with last-write-wins and read back whole.
pub trait PriceRepository: Send {
    /// All rows on or after `start`, ascending by date.
    fn load_table(&self, start: &str) -> Result<AlignedTable, StorageError>;
    /// Upserts every present value; returns the number of values written.
    fn save_table(&self, table: &[AlignedRow]) -> Result<usize, StorageError>;
    fn append_change(&self, record: &ChangeRecord) -> Result<(), StorageError>;
    /// Newest first.
    fn recent_changes(&self, limit: usize) -> Result<Vec<StoredChange>, StorageError>;
    fn log_fetch(
        &self,
        commodity: Commodity,
        status: FetchStatus,
        records: usize,
        error: Option<&str>,
        duration_ms: u64,
    ) -> Result<(), StorageError>;
    fn latest_prices(&self) -> Result<Vec<LatestPrice>, StorageError>;
    fn summary(&self) -> Result<Vec<SeriesSummary>, StorageError>;
}
