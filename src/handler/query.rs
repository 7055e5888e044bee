use serde::Serialize;

use crate::decode::{decode_json, BatteryHistoryRequest, FaultHistoryRequest};
use crate::publish::Publisher;
use crate::query::QueryService;

use super::{HandleError, Handled};

/// Answer a battery-history request on `reply_topic` with the battery's
/// temperature/charge readings.
pub async fn answer_battery_history(
    payload: &[u8],
    queries: &QueryService,
    publisher: &dyn Publisher,
    reply_topic: &str,
) -> Result<Handled, HandleError> {
    let request: BatteryHistoryRequest = decode_json(payload)?;
    let history = queries.battery_history(&request.battery_id).await?;
    reply(publisher, reply_topic, &history).await
}

/// Answer a fault-history request on `reply_topic`.
///
/// `search` is decoded but not applied; the reply always carries the full
/// fault history.
pub async fn answer_fault_history(
    payload: &[u8],
    queries: &QueryService,
    publisher: &dyn Publisher,
    reply_topic: &str,
) -> Result<Handled, HandleError> {
    let request: FaultHistoryRequest = decode_json(payload)?;
    tracing::debug!(search = request.search, "fault history requested");
    let history = queries.fault_history().await?;
    reply(publisher, reply_topic, &history).await
}

async fn reply<T: Serialize>(
    publisher: &dyn Publisher,
    reply_topic: &str,
    records: &[T],
) -> Result<Handled, HandleError> {
    let body = serde_json::to_string(records).map_err(|e| HandleError::Encode(e.to_string()))?;
    publisher.publish(reply_topic, body).await?;
    Ok(Handled::Replied {
        reply_topic: reply_topic.to_string(),
        records: records.len(),
    })
}
