//! Wire shapes for query replies.

use serde::Serialize;

use crate::store::{StatusRecord, TelemetryRecord};

/// Time-of-day format used on the wire (`HH:mm:ss`).
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Known fault codes. Anything outside the table is `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    TemperatureAbnormal,
    ChargeTooLow,
    SwapStationUnreachable,
    Unknown,
}

const STATUS_TABLE: [(i32, StatusKind); 3] = [
    (1, StatusKind::TemperatureAbnormal),
    (2, StatusKind::ChargeTooLow),
    (3, StatusKind::SwapStationUnreachable),
];

impl StatusKind {
    pub fn from_code(code: i32) -> Self {
        STATUS_TABLE
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, kind)| *kind)
            .unwrap_or(StatusKind::Unknown)
    }

    pub fn description(&self) -> &'static str {
        match self {
            StatusKind::TemperatureAbnormal => "battery temperature abnormal",
            StatusKind::ChargeTooLow => "battery charge too low",
            StatusKind::SwapStationUnreachable => "cannot reach nearest swap station",
            StatusKind::Unknown => "unknown status",
        }
    }
}

/// Element of the all-messages reply. Identifiers are deliberately omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryReply {
    #[serde(rename = "T")]
    pub temperature: f64,
    #[serde(rename = "C")]
    pub charge: f64,
}

/// Element of the history-tip reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultReply {
    #[serde(rename = "PID")]
    pub battery_id: String,
    pub status: &'static str,
    pub time: String,
}

/// Per-battery status history entry carrying the raw code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryStatusReply {
    #[serde(rename = "PID")]
    pub battery_id: String,
    pub status: i32,
    pub time: String,
}

pub fn telemetry_reply(record: &TelemetryRecord) -> TelemetryReply {
    TelemetryReply {
        temperature: record.temperature,
        charge: record.charge,
    }
}

pub fn fault_reply(record: &StatusRecord) -> FaultReply {
    FaultReply {
        battery_id: record.battery_id.clone(),
        status: StatusKind::from_code(record.status).description(),
        time: record.time.format(TIME_FORMAT).to_string(),
    }
}

pub fn battery_status_reply(record: &StatusRecord) -> BatteryStatusReply {
    BatteryStatusReply {
        battery_id: record.battery_id.clone(),
        status: record.status,
        time: record.time.format(TIME_FORMAT).to_string(),
    }
}
