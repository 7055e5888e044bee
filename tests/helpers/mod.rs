#![allow(dead_code)] // Test helpers appear unused when compiled independently

use battery_relay::{
    Dispatcher, FixedClock, MemoryStore, Observation, Observer, PublishError, Publisher,
    RecordStore, Topics,
};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Day stamped onto status events by `relay`.
pub fn test_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

/// Captures every reply instead of sending it to a broker.
#[derive(Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingPublisher {
    /// A publisher whose every publish fails as if the transport were gone.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Parse the only reply published so far.
    pub fn single_reply(&self) -> (String, Value) {
        let sent = self.sent();
        assert_eq!(sent.len(), 1, "expected exactly one reply, got {:?}", sent);
        let (topic, body) = sent.into_iter().next().unwrap();
        (topic, serde_json::from_str(&body).unwrap())
    }
}

#[async_trait::async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), PublishError> {
        if self.fail {
            return Err(PublishError::Closed);
        }
        self.sent.lock().unwrap().push((topic.to_string(), payload));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    seen: Mutex<Vec<Observation>>,
}

impl RecordingObserver {
    pub fn seen(&self) -> Vec<Observation> {
        self.seen.lock().unwrap().clone()
    }
}

impl Observer for RecordingObserver {
    fn observe(&self, observation: Observation) {
        self.seen.lock().unwrap().push(observation);
    }
}

pub struct TestRelay {
    pub dispatcher: Dispatcher,
    pub store: Arc<dyn RecordStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub observer: Arc<RecordingObserver>,
}

/// Dispatcher over an in-memory store with default topics and a fixed day.
pub fn relay() -> TestRelay {
    relay_with(Arc::new(MemoryStore::new()), RecordingPublisher::default())
}

pub fn relay_with(store: Arc<dyn RecordStore>, publisher: RecordingPublisher) -> TestRelay {
    let publisher = Arc::new(publisher);
    let observer = Arc::new(RecordingObserver::default());
    let dispatcher = Dispatcher::new(Topics::default(), store.clone(), publisher.clone())
        .with_observer(observer.clone())
        .with_clock(Arc::new(FixedClock(test_day())));
    TestRelay {
        dispatcher,
        store,
        publisher,
        observer,
    }
}
