// src/transport/mod.rs
pub mod mqtt;

pub use mqtt::{mqtt_options, MqttPublisher, MqttTransport};
