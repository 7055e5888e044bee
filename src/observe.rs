//! Observability seam for the dispatcher and handlers.
//!
//! Components report what happened to a message as an [`Observation`]
//! through an injected [`Observer`]. The service wires in
//! [`TracingObserver`]; tests record observations instead.

use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::route::Route;

/// Initialize tracing subscriber.
/// Uses RUST_LOG env var for filtering (defaults to info).
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true))
            .with(filter)
            .init();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Received {
        topic: String,
        payload: String,
    },
    UnknownTopic {
        topic: String,
    },
    Persisted {
        route: Route,
        battery_id: String,
    },
    Duplicate {
        route: Route,
        battery_id: String,
    },
    Rejected {
        route: Route,
        reason: String,
    },
    Replied {
        route: Route,
        reply_topic: String,
        records: usize,
    },
    Failed {
        route: Route,
        payload: String,
        error: String,
    },
}

pub trait Observer: Send + Sync {
    fn observe(&self, observation: Observation);
}

/// Forwards observations to `tracing` at a level matching their severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, observation: Observation) {
        match observation {
            Observation::Received { topic, payload } => {
                info!(topic = %topic, payload = %payload, "message received")
            }
            Observation::UnknownTopic { topic } => {
                warn!(topic = %topic, "unknown topic, message dropped")
            }
            Observation::Persisted { route, battery_id } => {
                info!(route = %route, battery_id = %battery_id, "record persisted")
            }
            Observation::Duplicate { route, battery_id } => {
                debug!(route = %route, battery_id = %battery_id, "duplicate record skipped")
            }
            Observation::Rejected { route, reason } => {
                warn!(route = %route, reason = %reason, "message rejected")
            }
            Observation::Replied {
                route,
                reply_topic,
                records,
            } => info!(route = %route, reply_topic = %reply_topic, records, "reply published"),
            Observation::Failed {
                route,
                payload,
                error,
            } => error!(route = %route, payload = %payload, error = %error, "message handling failed"),
        }
    }
}
