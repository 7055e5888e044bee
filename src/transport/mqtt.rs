//! MQTT transport: subscribes to the inbound topics, hands every publish to
//! the dispatcher, and publishes replies.
//!
//! Connection and reconnection are owned by rumqttc; polling the event loop
//! after an error reconnects.

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::config::{BrokerConfig, Topics};
use crate::dispatch::Dispatcher;
use crate::publish::{PublishError, Publisher};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Build client options from broker config. An empty client id gets a
/// generated one.
pub fn mqtt_options(config: &BrokerConfig) -> MqttOptions {
    let client_id = if config.client_id.trim().is_empty() {
        format!("battery-relay-{}", Uuid::new_v4())
    } else {
        config.client_id.clone()
    };

    let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
    options.set_clean_session(config.clean_session);
    if let Some(username) = &config.username {
        options.set_credentials(username.clone(), config.password.clone().unwrap_or_default());
    }
    options
}

/// Publishes replies at QoS 1, not retained.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Publisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), PublishError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload.into_bytes())
            .await
            .map_err(|e| PublishError::Client(e.to_string()))
    }
}

pub struct MqttTransport {
    client: AsyncClient,
    eventloop: EventLoop,
    subscriptions: Vec<String>,
    reconnect_delay: Duration,
}

impl MqttTransport {
    pub fn new(config: &BrokerConfig, topics: &Topics) -> Self {
        let (client, eventloop) = AsyncClient::new(mqtt_options(config), config.channel_capacity);
        Self {
            client,
            eventloop,
            subscriptions: topics.subscriptions().into_iter().map(String::from).collect(),
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
        }
    }

    pub fn publisher(&self) -> MqttPublisher {
        MqttPublisher::new(self.client.clone())
    }

    /// Poll the broker until `shutdown` fires. Each inbound publish is
    /// dispatched on its own task.
    pub async fn run(mut self, dispatcher: Arc<Dispatcher>, mut shutdown: oneshot::Receiver<()>) {
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown signal received");
                    break;
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "dispatch task aborted");
                    }
                }
                event = self.eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        info!(code = ?ack.code, session_present = ack.session_present, "connected to broker");
                        self.subscribe_all();
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let dispatcher = dispatcher.clone();
                        in_flight.spawn(async move {
                            dispatcher.dispatch(&publish.topic, &publish.payload).await;
                        });
                    }
                    Ok(Event::Incoming(Packet::SubAck(ack))) => {
                        debug!(pkid = ack.pkid, return_codes = ?ack.return_codes, "subscription acknowledged");
                    }
                    Ok(other) => trace!(event = ?other, "mqtt event"),
                    Err(e) => {
                        warn!(
                            error = %e,
                            retry_in_ms = self.reconnect_delay.as_millis() as u64,
                            "broker connection error"
                        );
                        tokio::select! {
                            _ = &mut shutdown => {
                                info!("shutdown signal received");
                                break;
                            }
                            _ = tokio::time::sleep(self.reconnect_delay) => {}
                        }
                    }
                }
            }
        }

        self.shutdown(in_flight).await;
    }

    fn subscribe_all(&self) {
        for topic in &self.subscriptions {
            match self.client.try_subscribe(topic.as_str(), QoS::AtLeastOnce) {
                Ok(()) => info!(topic = %topic, "subscribed"),
                Err(e) => warn!(topic = %topic, error = %e, "subscribe request failed"),
            }
        }
    }

    // Let in-flight dispatches finish, then send DISCONNECT. The event loop
    // must keep polling for queued replies and the disconnect to go out.
    async fn shutdown(mut self, mut in_flight: JoinSet<()>) {
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            loop {
                tokio::select! {
                    joined = in_flight.join_next() => {
                        if joined.is_none() {
                            break;
                        }
                    }
                    event = self.eventloop.poll() => {
                        if event.is_err() {
                            break;
                        }
                    }
                }
            }
        })
        .await;
        if drained.is_err() {
            warn!(pending = in_flight.len(), "dispatch tasks still running at shutdown");
            in_flight.abort_all();
        }

        if let Err(e) = self.client.try_disconnect() {
            warn!(error = %e, "disconnect request failed");
            return;
        }
        let _ = tokio::time::timeout(SHUTDOWN_GRACE, async {
            loop {
                match self.eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        })
        .await;
        info!("disconnected from broker");
    }
}
