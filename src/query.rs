//! Read-only history queries over the record store.

use std::sync::Arc;
use tracing::debug;

use crate::format::{
    battery_status_reply, fault_reply, telemetry_reply, BatteryStatusReply, FaultReply,
    TelemetryReply,
};
use crate::store::{RecordStore, StatusRecord, StoreError};

#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn RecordStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Temperature/charge history for one battery, in store order.
    pub async fn battery_history(
        &self,
        battery_id: &str,
    ) -> Result<Vec<TelemetryReply>, StoreError> {
        let records = self.store.find_telemetry_by_battery(battery_id).await?;
        debug!(battery_id, count = records.len(), "battery history fetched");
        Ok(records.iter().map(telemetry_reply).collect())
    }

    /// Every fault event, with codes resolved to descriptions.
    pub async fn fault_history(&self) -> Result<Vec<FaultReply>, StoreError> {
        let records = self.store.find_all_status().await?;
        debug!(count = records.len(), "fault history fetched");
        Ok(records.iter().map(fault_reply).collect())
    }

    /// Raw status records, optionally restricted to one code.
    pub async fn status_history(&self, code: Option<i32>) -> Result<Vec<StatusRecord>, StoreError> {
        let records = match code {
            Some(code) => self.store.find_status_by_code(code).await?,
            None => self.store.find_all_status().await?,
        };
        debug!(?code, count = records.len(), "status history fetched");
        Ok(records)
    }

    /// Status history for one battery with the raw integer code.
    pub async fn battery_status_history(
        &self,
        battery_id: &str,
    ) -> Result<Vec<BatteryStatusReply>, StoreError> {
        let records = self.store.find_status_by_battery(battery_id).await?;
        debug!(battery_id, count = records.len(), "battery status history fetched");
        Ok(records.iter().map(battery_status_reply).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StatusEvent, TelemetryReading};
    use chrono::NaiveDate;

    async fn seeded() -> QueryService {
        let store = Arc::new(MemoryStore::new());
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        for (pid, t, c) in [("B1", 25.0, 80.0), ("B2", 30.0, 20.0), ("B1", 26.5, 79.0)] {
            store
                .insert_telemetry(&TelemetryReading {
                    vehicle_id: "V1".to_string(),
                    battery_id: pid.to_string(),
                    temperature: t,
                    charge: c,
                })
                .await
                .unwrap();
        }
        for (pid, code, hour) in [("B1", 1, 8), ("B2", 2, 9), ("B1", 7, 10)] {
            store
                .insert_status(&StatusEvent {
                    battery_id: pid.to_string(),
                    status: code,
                    time: day.and_hms_opt(hour, 15, 0).unwrap(),
                })
                .await
                .unwrap();
        }
        QueryService::new(store)
    }

    #[tokio::test]
    async fn battery_history_keeps_store_order() {
        let queries = seeded().await;
        let history = queries.battery_history("B1").await.unwrap();
        assert_eq!(
            history,
            vec![
                TelemetryReply {
                    temperature: 25.0,
                    charge: 80.0
                },
                TelemetryReply {
                    temperature: 26.5,
                    charge: 79.0
                },
            ]
        );
        assert!(queries.battery_history("B9").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fault_history_returns_everything_described() {
        let queries = seeded().await;
        let history = queries.fault_history().await.unwrap();
        let statuses: Vec<_> = history.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                "battery temperature abnormal",
                "battery charge too low",
                "unknown status"
            ]
        );
        assert_eq!(history[2].time, "10:15:00");
    }

    #[tokio::test]
    async fn status_history_filters_by_code() {
        let queries = seeded().await;
        assert_eq!(queries.status_history(None).await.unwrap().len(), 3);
        let only_two = queries.status_history(Some(2)).await.unwrap();
        assert_eq!(only_two.len(), 1);
        assert_eq!(only_two[0].battery_id, "B2");
    }

    #[tokio::test]
    async fn battery_status_history_keeps_raw_codes() {
        let queries = seeded().await;
        let history = queries.battery_status_history("B1").await.unwrap();
        let codes: Vec<_> = history.iter().map(|r| r.status).collect();
        assert_eq!(codes, vec![1, 7]);
    }
}
