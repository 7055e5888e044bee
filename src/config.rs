use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::route::Route;
use crate::store::MEMORY_URL;

pub const CONFIG_FILENAME: &str = "battery-relay.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub broker: BrokerConfig,
    pub topics: Topics,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means a generated `battery-relay-<uuid>` id.
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub keep_alive_secs: u64,
    pub clean_session: bool,
    pub reconnect_delay_ms: u64,
    pub channel_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "battery-relay".to_string(),
            username: None,
            password: None,
            keep_alive_secs: 60,
            clean_session: true,
            reconnect_delay_ms: 5000,
            channel_capacity: 10,
        }
    }
}

/// Topic names for the four inbound roles and the two reply topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topics {
    pub telemetry_ingest: String,
    pub status_ingest: String,
    pub battery_history_query: String,
    pub fault_history_query: String,
    pub all_messages: String,
    pub history_tip: String,
}

impl Default for Topics {
    fn default() -> Self {
        Self {
            telemetry_ingest: "subCarData".to_string(),
            status_ingest: "subTip".to_string(),
            battery_history_query: "pubCarVID".to_string(),
            fault_history_query: "pubTip".to_string(),
            all_messages: "subAllMsg".to_string(),
            history_tip: "subHistoryTip".to_string(),
        }
    }
}

impl Topics {
    /// Inbound topic name for a route
    pub fn inbound(&self, route: Route) -> &str {
        match route {
            Route::TelemetryIngest => &self.telemetry_ingest,
            Route::StatusIngest => &self.status_ingest,
            Route::BatteryHistoryQuery => &self.battery_history_query,
            Route::FaultHistoryQuery => &self.fault_history_query,
        }
    }

    /// Reply topic paired with a query route; `None` for ingest routes.
    pub fn reply(&self, route: Route) -> Option<&str> {
        match route {
            Route::BatteryHistoryQuery => Some(&self.all_messages),
            Route::FaultHistoryQuery => Some(&self.history_tip),
            Route::TelemetryIngest | Route::StatusIngest => None,
        }
    }

    /// Exact-match lookup. No wildcards.
    pub fn route(&self, topic: &str) -> Option<Route> {
        Route::all()
            .iter()
            .copied()
            .find(|route| self.inbound(*route) == topic)
    }

    pub fn subscriptions(&self) -> Vec<&str> {
        Route::all().iter().map(|route| self.inbound(*route)).collect()
    }

    pub fn validate(&self) -> Result<()> {
        for route in Route::all() {
            if self.inbound(*route).trim().is_empty() {
                bail!("topic for {} must not be empty", route);
            }
            if let Some(reply) = self.reply(*route) {
                if reply.trim().is_empty() {
                    bail!("reply topic for {} must not be empty", route);
                }
            }
        }

        let inbound = self.subscriptions();
        for (i, topic) in inbound.iter().enumerate() {
            if inbound[i + 1..].contains(topic) {
                bail!("topic '{}' is configured for more than one route", topic);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// `memory` or a sqlite URL such as `sqlite://battery-relay.db`
    pub url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://battery-relay.db".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_URL
    }
}

impl Config {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.as_ref().display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.broker.host.trim().is_empty() {
            bail!("broker.host must not be empty");
        }
        if self.broker.channel_capacity == 0 {
            bail!("broker.channel_capacity must be at least 1");
        }
        self.topics.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.topics.telemetry_ingest, "subCarData");
        assert_eq!(config.broker.port, 1883);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[broker]
host = "mqtt.example.com"
username = "relay"
password = "secret"

[topics]
history_tip = "faults/reply"

[store]
url = "memory"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.broker.host, "mqtt.example.com");
        assert_eq!(config.broker.port, 1883);
        assert_eq!(config.broker.username.as_deref(), Some("relay"));
        assert_eq!(config.topics.history_tip, "faults/reply");
        assert_eq!(config.topics.all_messages, "subAllMsg");
        assert!(config.store.is_memory());
    }

    #[test]
    fn test_route_is_exact_match() {
        let topics = Topics::default();
        assert_eq!(topics.route("subCarData"), Some(Route::TelemetryIngest));
        assert_eq!(topics.route("subTip"), Some(Route::StatusIngest));
        assert_eq!(topics.route("pubCarVID"), Some(Route::BatteryHistoryQuery));
        assert_eq!(topics.route("pubTip"), Some(Route::FaultHistoryQuery));
        assert_eq!(topics.route("subcardata"), None);
        assert_eq!(topics.route("subCarData/extra"), None);
        assert_eq!(topics.route("subAllMsg"), None);
    }

    #[test]
    fn test_reply_topics_pair_with_queries() {
        let topics = Topics::default();
        assert_eq!(topics.reply(Route::BatteryHistoryQuery), Some("subAllMsg"));
        assert_eq!(topics.reply(Route::FaultHistoryQuery), Some("subHistoryTip"));
        assert_eq!(topics.reply(Route::TelemetryIngest), None);
    }

    #[test]
    fn test_validate_rejects_shared_inbound_topic() {
        let topics = Topics {
            status_ingest: "subCarData".to_string(),
            ..Topics::default()
        };
        let err = topics.validate().unwrap_err();
        assert!(err.to_string().contains("more than one route"));
    }

    #[test]
    fn test_validate_rejects_empty_topic() {
        let topics = Topics {
            fault_history_query: " ".to_string(),
            ..Topics::default()
        };
        assert!(topics.validate().is_err());
    }

    #[test]
    fn test_load_config_not_found() {
        let result = Config::load_from_path("/nonexistent/battery-relay.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        let mut config = Config::default();
        config.broker.username = Some("relay".to_string());
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
