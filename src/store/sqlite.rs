//! SQLite record store.
//!
//! Unique indexes on the dedup keys let the conditional inserts run as a
//! single `INSERT OR IGNORE`, so concurrent identical messages cannot both
//! land.

use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use super::{
    RecordStore, StatusEvent, StatusRecord, StoreError, TelemetryReading, TelemetryRecord,
};

const MAX_CONNECTIONS: u32 = 5;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS battery_telemetry (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        vid TEXT NOT NULL,
        pid TEXT NOT NULL,
        temperature REAL NOT NULL,
        charge REAL NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS battery_telemetry_dedup
        ON battery_telemetry (pid, temperature, charge)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS battery_status (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pid TEXT NOT NULL,
        status INTEGER NOT NULL,
        time TEXT NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS battery_status_dedup
        ON battery_status (pid, status, time)
    "#,
];

const TELEMETRY_COLUMNS: &str =
    "SELECT id, vid AS vehicle_id, pid AS battery_id, temperature, charge FROM battery_telemetry";

const STATUS_COLUMNS: &str = "SELECT id, pid AS battery_id, status, time FROM battery_status";

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Query(e.to_string())
    }
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `url` (e.g. `sqlite://relay.db` or `sqlite::memory:`),
    /// creating the database file and schema when missing.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Connect(e.to_string()))?
            .create_if_missing(true);

        // Every connection to an in-memory database gets its own database,
        // so keep exactly one connection alive.
        let in_memory = url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new();
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            pool_options.max_connections(MAX_CONNECTIONS)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        let store = Self { pool };
        store.create_schema().await?;
        Ok(store)
    }

    async fn create_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("sqlite schema ready");
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for SqliteStore {
    async fn insert_telemetry(&self, reading: &TelemetryReading) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO battery_telemetry (vid, pid, temperature, charge) VALUES (?, ?, ?, ?)",
        )
        .bind(&reading.vehicle_id)
        .bind(&reading.battery_id)
        .bind(reading.temperature)
        .bind(reading.charge)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn find_telemetry_by_battery(
        &self,
        battery_id: &str,
    ) -> Result<Vec<TelemetryRecord>, StoreError> {
        let sql = format!("{} WHERE pid = ? ORDER BY id", TELEMETRY_COLUMNS);
        let records = sqlx::query_as::<_, TelemetryRecord>(&sql)
            .bind(battery_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn telemetry_duplicate_exists(
        &self,
        battery_id: &str,
        temperature: f64,
        charge: f64,
    ) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM battery_telemetry WHERE pid = ? AND temperature = ? AND charge = ?",
        )
        .bind(battery_id)
        .bind(temperature)
        .bind(charge)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn insert_status(&self, event: &StatusEvent) -> Result<u64, StoreError> {
        let result = sqlx::query("INSERT INTO battery_status (pid, status, time) VALUES (?, ?, ?)")
            .bind(&event.battery_id)
            .bind(event.status)
            .bind(event.time)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_status_by_battery(
        &self,
        battery_id: &str,
    ) -> Result<Vec<StatusRecord>, StoreError> {
        let sql = format!("{} WHERE pid = ? ORDER BY id", STATUS_COLUMNS);
        let records = sqlx::query_as::<_, StatusRecord>(&sql)
            .bind(battery_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn find_all_status(&self) -> Result<Vec<StatusRecord>, StoreError> {
        let sql = format!("{} ORDER BY id", STATUS_COLUMNS);
        let records = sqlx::query_as::<_, StatusRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn find_status_by_code(&self, code: i32) -> Result<Vec<StatusRecord>, StoreError> {
        let sql = format!("{} WHERE status = ? ORDER BY id", STATUS_COLUMNS);
        let records = sqlx::query_as::<_, StatusRecord>(&sql)
            .bind(code)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn status_duplicate_exists(
        &self,
        battery_id: &str,
        code: i32,
        time: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM battery_status WHERE pid = ? AND status = ? AND time = ?",
        )
        .bind(battery_id)
        .bind(code)
        .bind(time)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn insert_telemetry_if_absent(
        &self,
        reading: &TelemetryReading,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO battery_telemetry (vid, pid, temperature, charge) VALUES (?, ?, ?, ?)",
        )
        .bind(&reading.vehicle_id)
        .bind(&reading.battery_id)
        .bind(reading.temperature)
        .bind(reading.charge)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn insert_status_if_absent(&self, event: &StatusEvent) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO battery_status (pid, status, time) VALUES (?, ?, ?)",
        )
        .bind(&event.battery_id)
        .bind(event.status)
        .bind(event.time)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
        debug!("sqlite pool closed");
    }
}
