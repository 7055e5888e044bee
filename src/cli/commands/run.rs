use anyhow::{Context, Result};
use tokio::sync::oneshot;
use tracing::{error, info};

use crate::cli::RunArgs;
use crate::config::Config;
use crate::observe::init_tracing;
use crate::service;

/// Apply command-line and environment overrides on top of the file config.
pub fn apply_overrides(mut config: Config, args: &RunArgs) -> Config {
    if let Some(host) = &args.broker_host {
        config.broker.host = host.clone();
    }
    if let Some(port) = args.broker_port {
        config.broker.port = port;
    }
    if let Some(username) = &args.username {
        config.broker.username = Some(username.clone());
    }
    if let Some(password) = &args.password {
        config.broker.password = Some(password.clone());
    }
    if let Some(url) = &args.store_url {
        config.store.url = url.clone();
    }
    config
}

pub async fn execute_run(args: RunArgs) -> Result<()> {
    init_tracing(args.log_json);

    let config = Config::load_from_path(&args.config).with_context(|| {
        format!(
            "No usable config at {}. Run 'battery-relay init' first.",
            args.config.display()
        )
    })?;
    let config = apply_overrides(config, &args);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("ctrl-c received"),
            Err(e) => error!(error = %e, "failed to listen for ctrl-c"),
        }
        let _ = shutdown_tx.send(());
    });

    service::run(config, shutdown_rx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> RunArgs {
        RunArgs {
            config: PathBuf::from("battery-relay.toml"),
            broker_host: None,
            broker_port: None,
            username: None,
            password: None,
            store_url: None,
            log_json: false,
        }
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let config = apply_overrides(Config::default(), &args());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides_replace_fields() {
        let args = RunArgs {
            broker_host: Some("broker.internal".to_string()),
            broker_port: Some(8883),
            username: Some("relay".to_string()),
            store_url: Some("memory".to_string()),
            ..args()
        };
        let config = apply_overrides(Config::default(), &args);
        assert_eq!(config.broker.host, "broker.internal");
        assert_eq!(config.broker.port, 8883);
        assert_eq!(config.broker.username.as_deref(), Some("relay"));
        assert_eq!(config.broker.password, None);
        assert!(config.store.is_memory());
    }
}
