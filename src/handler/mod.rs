use crate::decode::DecodeError;
use crate::publish::PublishError;
use crate::store::StoreError;

mod ingest;
mod query;

pub use ingest::{ingest_status, ingest_telemetry};
pub use query::{answer_battery_history, answer_fault_history};

#[derive(Debug)]
pub enum HandleError {
    Decode(DecodeError),
    InvalidTime(String),
    Store(StoreError),
    Encode(String),
    Publish(PublishError),
}

impl std::fmt::Display for HandleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleError::Decode(e) => write!(f, "decode error: {}", e),
            HandleError::InvalidTime(e) => write!(f, "invalid time: {}", e),
            HandleError::Store(e) => write!(f, "{}", e),
            HandleError::Encode(e) => write!(f, "encode error: {}", e),
            HandleError::Publish(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for HandleError {}

impl From<DecodeError> for HandleError {
    fn from(e: DecodeError) -> Self {
        HandleError::Decode(e)
    }
}

impl From<StoreError> for HandleError {
    fn from(e: StoreError) -> Self {
        HandleError::Store(e)
    }
}

impl From<PublishError> for HandleError {
    fn from(e: PublishError) -> Self {
        HandleError::Publish(e)
    }
}

/// What a handler did with a message that it processed to completion
#[derive(Debug, Clone, PartialEq)]
pub enum Handled {
    Persisted { battery_id: String },
    Duplicate { battery_id: String },
    Rejected { reason: String },
    Replied { reply_topic: String, records: usize },
}
