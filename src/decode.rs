//! Typed decoding of inbound JSON payloads.
//!
//! Publishers are loose about JSON types: numeric fields arrive as numbers or
//! as numeric strings, and identifiers sometimes arrive as numbers. The
//! deserializers here coerce those representations and reject anything else,
//! so a missing or mistyped field never reaches the handlers.

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError(pub String);

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DecodeError {}

/// Telemetry published on the telemetry-ingest topic.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelemetryPayload {
    #[serde(rename = "VID", deserialize_with = "coerce_text")]
    pub vehicle_id: String,
    #[serde(rename = "PID", deserialize_with = "coerce_text")]
    pub battery_id: String,
    #[serde(rename = "T", deserialize_with = "coerce_f64")]
    pub temperature: f64,
    #[serde(rename = "C", deserialize_with = "coerce_f64")]
    pub charge: f64,
}

/// Fault event published on the status-ingest topic. `time` is validated by
/// the ingest handler, not here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusPayload {
    #[serde(rename = "PID", default, deserialize_with = "coerce_opt_text")]
    pub battery_id: Option<String>,
    #[serde(deserialize_with = "coerce_i32")]
    pub status: i32,
    #[serde(deserialize_with = "coerce_text")]
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatteryHistoryRequest {
    #[serde(rename = "PID", deserialize_with = "coerce_text")]
    pub battery_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FaultHistoryRequest {
    #[serde(deserialize_with = "coerce_i32")]
    pub search: i32,
}

/// Decode a UTF-8 JSON payload into `T`.
pub fn decode_json<'a, T: Deserialize<'a>>(payload: &'a [u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(payload).map_err(|e| DecodeError(e.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

fn coerce_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Loose::deserialize(deserializer)? {
        Loose::Text(s) => Ok(s),
        Loose::Int(n) => Ok(n.to_string()),
        Loose::Float(n) => Ok(n.to_string()),
        Loose::Bool(b) => Ok(b.to_string()),
    }
}

fn coerce_opt_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value: Option<Loose> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        Loose::Text(s) => s,
        Loose::Int(n) => n.to_string(),
        Loose::Float(n) => n.to_string(),
        Loose::Bool(b) => b.to_string(),
    }))
}

fn coerce_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = match Loose::deserialize(deserializer)? {
        Loose::Int(n) => n as f64,
        Loose::Float(n) => n,
        Loose::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("not a number: {:?}", s)))?,
        Loose::Bool(_) => return Err(de::Error::custom("expected a number, got a boolean")),
    };
    if !value.is_finite() {
        return Err(de::Error::custom("number must be finite"));
    }
    Ok(value)
}

fn coerce_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = match Loose::deserialize(deserializer)? {
        Loose::Int(n) => n,
        Loose::Float(n) if n.is_finite() => n.trunc() as i64,
        Loose::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("not an integer: {:?}", s)))?,
        _ => return Err(de::Error::custom("expected an integer")),
    };
    i32::try_from(value).map_err(|_| de::Error::custom(format!("integer out of range: {}", value)))
}
