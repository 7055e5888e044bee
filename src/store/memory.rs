//! In-memory record store. Retrieval order is insertion order.

use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use super::{
    RecordStore, StatusEvent, StatusRecord, StoreError, TelemetryReading, TelemetryRecord,
};

#[derive(Default)]
struct Tables {
    telemetry: Vec<TelemetryRecord>,
    status: Vec<StatusRecord>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn has_telemetry(&self, battery_id: &str, temperature: f64, charge: f64) -> bool {
        self.telemetry.iter().any(|r| {
            r.battery_id == battery_id && r.temperature == temperature && r.charge == charge
        })
    }

    fn has_status(&self, battery_id: &str, code: i32, time: NaiveDateTime) -> bool {
        self.status
            .iter()
            .any(|r| r.battery_id == battery_id && r.status == code && r.time == time)
    }

    fn push_telemetry(&mut self, reading: &TelemetryReading) {
        let id = self.next_id();
        self.telemetry.push(TelemetryRecord {
            id,
            vehicle_id: reading.vehicle_id.clone(),
            battery_id: reading.battery_id.clone(),
            temperature: reading.temperature,
            charge: reading.charge,
        });
    }

    fn push_status(&mut self, event: &StatusEvent) {
        let id = self.next_id();
        self.status.push(StatusRecord {
            id,
            battery_id: event.battery_id.clone(),
            status: event.status,
            time: event.time,
        });
    }
}

/// Record store backed by process memory. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn insert_telemetry(&self, reading: &TelemetryReading) -> Result<u64, StoreError> {
        self.tables.write().await.push_telemetry(reading);
        Ok(1)
    }

    async fn find_telemetry_by_battery(
        &self,
        battery_id: &str,
    ) -> Result<Vec<TelemetryRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .telemetry
            .iter()
            .filter(|r| r.battery_id == battery_id)
            .cloned()
            .collect())
    }

    async fn telemetry_duplicate_exists(
        &self,
        battery_id: &str,
        temperature: f64,
        charge: f64,
    ) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.has_telemetry(battery_id, temperature, charge))
    }

    async fn insert_status(&self, event: &StatusEvent) -> Result<u64, StoreError> {
        self.tables.write().await.push_status(event);
        Ok(1)
    }

    async fn find_status_by_battery(
        &self,
        battery_id: &str,
    ) -> Result<Vec<StatusRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .status
            .iter()
            .filter(|r| r.battery_id == battery_id)
            .cloned()
            .collect())
    }

    async fn find_all_status(&self) -> Result<Vec<StatusRecord>, StoreError> {
        Ok(self.tables.read().await.status.clone())
    }

    async fn find_status_by_code(&self, code: i32) -> Result<Vec<StatusRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .status
            .iter()
            .filter(|r| r.status == code)
            .cloned()
            .collect())
    }

    async fn status_duplicate_exists(
        &self,
        battery_id: &str,
        code: i32,
        time: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.has_status(battery_id, code, time))
    }

    // Check and insert under one write lock.
    async fn insert_telemetry_if_absent(
        &self,
        reading: &TelemetryReading,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.has_telemetry(&reading.battery_id, reading.temperature, reading.charge) {
            return Ok(0);
        }
        tables.push_telemetry(reading);
        Ok(1)
    }

    async fn insert_status_if_absent(&self, event: &StatusEvent) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.has_status(&event.battery_id, event.status, event.time) {
            return Ok(0);
        }
        tables.push_status(event);
        Ok(1)
    }
}
