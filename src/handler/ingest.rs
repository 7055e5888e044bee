use chrono::{NaiveTime, Timelike};

use crate::clock::Clock;
use crate::decode::{decode_json, StatusPayload, TelemetryPayload};
use crate::format::TIME_FORMAT;
use crate::store::{RecordStore, StatusEvent, TelemetryReading};

use super::{HandleError, Handled};

/// Decode a telemetry message and persist it unless an identical reading
/// for the same battery is already stored.
pub async fn ingest_telemetry(
    payload: &[u8],
    store: &dyn RecordStore,
) -> Result<Handled, HandleError> {
    let telemetry: TelemetryPayload = decode_json(payload)?;

    if telemetry.battery_id.trim().is_empty() {
        return Ok(Handled::Rejected {
            reason: "blank PID".to_string(),
        });
    }

    let reading = TelemetryReading {
        vehicle_id: telemetry.vehicle_id,
        battery_id: telemetry.battery_id,
        temperature: telemetry.temperature,
        charge: telemetry.charge,
    };

    let written = store.insert_telemetry_if_absent(&reading).await?;
    Ok(outcome(written, reading.battery_id))
}

/// Decode a status message, stamp its time-of-day with the clock's current
/// day, and persist it unless an identical event is already stored.
pub async fn ingest_status(
    payload: &[u8],
    store: &dyn RecordStore,
    clock: &dyn Clock,
) -> Result<Handled, HandleError> {
    let status: StatusPayload = decode_json(payload)?;

    let battery_id = match status.battery_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => {
            return Ok(Handled::Rejected {
                reason: "blank PID".to_string(),
            })
        }
    };

    let time = parse_time_of_day(&status.time)?;

    let event = StatusEvent {
        battery_id,
        status: status.status,
        time: clock.today().and_time(time),
    };

    let written = store.insert_status_if_absent(&event).await?;
    Ok(outcome(written, event.battery_id))
}

/// Parse a strict two-digit `HH:MM:SS` time. chrono alone accepts one-digit
/// fields and a leap second.
fn parse_time_of_day(text: &str) -> Result<NaiveTime, HandleError> {
    let invalid = |reason: &str| HandleError::InvalidTime(format!("{:?}: {}", text, reason));

    let shaped = text.len() == 8
        && text.bytes().enumerate().all(|(i, b)| match i {
            2 | 5 => b == b':',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(invalid("expected HH:MM:SS"));
    }

    let time = NaiveTime::parse_from_str(text, TIME_FORMAT).map_err(|e| invalid(&e.to_string()))?;
    if time.nanosecond() >= 1_000_000_000 {
        return Err(invalid("leap second"));
    }
    Ok(time)
}

fn outcome(written: u64, battery_id: String) -> Handled {
    if written == 0 {
        Handled::Duplicate { battery_id }
    } else {
        Handled::Persisted { battery_id }
    }
}
