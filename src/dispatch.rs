//! Topic router: one inbound message in, one handler invoked, nothing
//! propagated.

use std::sync::Arc;
use tracing::Span;

use crate::clock::{Clock, LocalClock};
use crate::config::Topics;
use crate::handler::{
    answer_battery_history, answer_fault_history, ingest_status, ingest_telemetry, HandleError,
    Handled,
};
use crate::observe::{Observation, Observer, TracingObserver};
use crate::publish::Publisher;
use crate::query::QueryService;
use crate::route::Route;
use crate::store::RecordStore;

/// Result of dispatching one message. Returned for callers and tests; the
/// dispatcher has already observed it.
#[derive(Debug)]
pub enum Dispatch {
    Handled(Route, Handled),
    UnknownTopic,
    Failed(Route, HandleError),
}

pub struct Dispatcher {
    topics: Topics,
    store: Arc<dyn RecordStore>,
    queries: QueryService,
    publisher: Arc<dyn Publisher>,
    observer: Arc<dyn Observer>,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(topics: Topics, store: Arc<dyn RecordStore>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            topics,
            queries: QueryService::new(store.clone()),
            store,
            publisher,
            observer: Arc::new(TracingObserver),
            clock: Arc::new(LocalClock),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Route `payload` by exact topic match and run the matching handler.
    /// Failures are observed here and never returned as errors.
    #[tracing::instrument(
        name = "dispatch",
        skip(self, topic, payload),
        fields(topic = %topic, route = tracing::field::Empty)
    )]
    pub async fn dispatch(&self, topic: &str, payload: &[u8]) -> Dispatch {
        let text = String::from_utf8_lossy(payload).into_owned();
        self.observer.observe(Observation::Received {
            topic: topic.to_string(),
            payload: text.clone(),
        });

        let Some(route) = self.topics.route(topic) else {
            self.observer.observe(Observation::UnknownTopic {
                topic: topic.to_string(),
            });
            return Dispatch::UnknownTopic;
        };
        Span::current().record("route", route.name());

        match self.handle(route, payload).await {
            Ok(handled) => {
                self.observer.observe(observation_for(route, &handled));
                Dispatch::Handled(route, handled)
            }
            Err(error) => {
                self.observer.observe(Observation::Failed {
                    route,
                    payload: text,
                    error: error.to_string(),
                });
                Dispatch::Failed(route, error)
            }
        }
    }

    async fn handle(&self, route: Route, payload: &[u8]) -> Result<Handled, HandleError> {
        match route {
            Route::TelemetryIngest => ingest_telemetry(payload, self.store.as_ref()).await,
            Route::StatusIngest => {
                ingest_status(payload, self.store.as_ref(), self.clock.as_ref()).await
            }
            Route::BatteryHistoryQuery => {
                answer_battery_history(
                    payload,
                    &self.queries,
                    self.publisher.as_ref(),
                    &self.topics.all_messages,
                )
                .await
            }
            Route::FaultHistoryQuery => {
                answer_fault_history(
                    payload,
                    &self.queries,
                    self.publisher.as_ref(),
                    &self.topics.history_tip,
                )
                .await
            }
        }
    }
}

fn observation_for(route: Route, handled: &Handled) -> Observation {
    match handled {
        Handled::Persisted { battery_id } => Observation::Persisted {
            route,
            battery_id: battery_id.clone(),
        },
        Handled::Duplicate { battery_id } => Observation::Duplicate {
            route,
            battery_id: battery_id.clone(),
        },
        Handled::Rejected { reason } => Observation::Rejected {
            route,
            reason: reason.clone(),
        },
        Handled::Replied {
            reply_topic,
            records,
        } => Observation::Replied {
            route,
            reply_topic: reply_topic.clone(),
            records: *records,
        },
    }
}
