//! Record store abstraction for battery telemetry and status events.
//!
//! The ingestion side is the only writer. Query handlers only call the
//! `find_*` operations.

pub mod memory;
pub mod sqlite;

use chrono::NaiveDateTime;
use std::sync::Arc;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// URL selecting the in-memory store.
pub const MEMORY_URL: &str = "memory";

/// A decoded telemetry reading that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryReading {
    pub vehicle_id: String,
    pub battery_id: String,
    pub temperature: f64,
    pub charge: f64,
}

/// A persisted telemetry reading.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TelemetryRecord {
    pub id: i64,
    pub vehicle_id: String,
    pub battery_id: String,
    pub temperature: f64,
    pub charge: f64,
}

/// A decoded fault/status event that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub battery_id: String,
    pub status: i32,
    pub time: NaiveDateTime,
}

/// A persisted fault/status event. `status` is the raw code as received.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StatusRecord {
    pub id: i64,
    pub battery_id: String,
    pub status: i32,
    pub time: NaiveDateTime,
}

#[derive(Debug)]
pub enum StoreError {
    UnsupportedUrl(String),
    Connect(String),
    Query(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::UnsupportedUrl(url) => write!(f, "unsupported store url: {}", url),
            StoreError::Connect(e) => write!(f, "store connect error: {}", e),
            StoreError::Query(e) => write!(f, "store query error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable storage for the two record kinds.
///
/// The duplicate check and the insert are separate calls. Callers that need
/// idempotent writes use the `*_if_absent` operations, which stores override
/// when they can make the check and the insert atomic.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_telemetry(&self, reading: &TelemetryReading) -> Result<u64, StoreError>;

    async fn find_telemetry_by_battery(
        &self,
        battery_id: &str,
    ) -> Result<Vec<TelemetryRecord>, StoreError>;

    async fn telemetry_duplicate_exists(
        &self,
        battery_id: &str,
        temperature: f64,
        charge: f64,
    ) -> Result<bool, StoreError>;

    async fn insert_status(&self, event: &StatusEvent) -> Result<u64, StoreError>;

    async fn find_status_by_battery(&self, battery_id: &str)
        -> Result<Vec<StatusRecord>, StoreError>;

    async fn find_all_status(&self) -> Result<Vec<StatusRecord>, StoreError>;

    async fn find_status_by_code(&self, code: i32) -> Result<Vec<StatusRecord>, StoreError>;

    async fn status_duplicate_exists(
        &self,
        battery_id: &str,
        code: i32,
        time: NaiveDateTime,
    ) -> Result<bool, StoreError>;

    /// Insert unless an identical (battery, temperature, charge) reading exists.
    /// Returns the number of rows written (0 for a duplicate).
    async fn insert_telemetry_if_absent(
        &self,
        reading: &TelemetryReading,
    ) -> Result<u64, StoreError> {
        if self
            .telemetry_duplicate_exists(&reading.battery_id, reading.temperature, reading.charge)
            .await?
        {
            return Ok(0);
        }
        self.insert_telemetry(reading).await
    }

    /// Insert unless an identical (battery, code, timestamp) event exists.
    /// Returns the number of rows written (0 for a duplicate).
    async fn insert_status_if_absent(&self, event: &StatusEvent) -> Result<u64, StoreError> {
        if self
            .status_duplicate_exists(&event.battery_id, event.status, event.time)
            .await?
        {
            return Ok(0);
        }
        self.insert_status(event).await
    }

    /// Release connections before shutdown. A no-op for stores without any.
    async fn close(&self) {}
}

/// Open the store selected by `url`: `memory` or a `sqlite:` URL.
pub async fn open_store(url: &str) -> Result<Arc<dyn RecordStore>, StoreError> {
    if url == MEMORY_URL {
        tracing::info!("using in-memory record store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    if url.starts_with("sqlite:") {
        let store = SqliteStore::connect(url).await?;
        tracing::info!(url, "using sqlite record store");
        return Ok(Arc::new(store));
    }
    Err(StoreError::UnsupportedUrl(url.to_string()))
}
