// src/lib.rs
pub mod cli;
pub mod clock;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod format;
pub mod handler;
pub mod observe;
pub mod publish;
pub mod query;
mod route;
pub mod service;
pub mod store;
pub mod transport;

pub use route::Route;

pub use clock::{Clock, FixedClock, LocalClock};
pub use config::{Config, Topics};
pub use dispatch::{Dispatch, Dispatcher};
pub use handler::{HandleError, Handled};
pub use observe::{Observation, Observer, TracingObserver};
pub use publish::{PublishError, Publisher};
pub use query::QueryService;
pub use store::{open_store, MemoryStore, RecordStore, SqliteStore, StoreError};
