use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::store::open_store;
use crate::transport::MqttTransport;

/// Open the store, connect to the broker and dispatch until `shutdown`
/// fires.
pub async fn run(config: Config, shutdown: oneshot::Receiver<()>) -> Result<()> {
    config.validate()?;

    let store = open_store(&config.store.url)
        .await
        .with_context(|| format!("Failed to open record store {}", config.store.url))?;

    let transport = MqttTransport::new(&config.broker, &config.topics);
    let publisher = Arc::new(transport.publisher());
    let dispatcher = Arc::new(Dispatcher::new(
        config.topics.clone(),
        store.clone(),
        publisher,
    ));

    let store_kind = if config.store.is_memory() {
        "memory"
    } else {
        "sqlite"
    };
    info!(
        host = %config.broker.host,
        port = config.broker.port,
        store = store_kind,
        subscriptions = ?config.topics.subscriptions(),
        "starting battery relay"
    );
    if config.store.is_memory() {
        warn!("in-memory store selected, records are lost on exit");
    }

    transport.run(dispatcher, shutdown).await;
    store.close().await;
    Ok(())
}
