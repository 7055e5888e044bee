use anyhow::Result;

use crate::cli::CheckArgs;
use crate::config::{Config, Topics};
use crate::route::Route;

/// One line per inbound route: role, topic, and reply topic if any.
pub fn routing_table(topics: &Topics) -> Vec<String> {
    Route::all()
        .iter()
        .map(|route| match topics.reply(*route) {
            Some(reply) => format!(
                "{:<22} {} -> {}",
                route.name(),
                topics.inbound(*route),
                reply
            ),
            None => format!("{:<22} {}", route.name(), topics.inbound(*route)),
        })
        .collect()
}

pub fn execute_check(args: CheckArgs) -> Result<()> {
    let config = Config::load_from_path(&args.config)?;

    println!("config: {}", args.config.display());
    println!("broker: {}:{}", config.broker.host, config.broker.port);
    println!("store:  {}", config.store.url);
    println!();
    for line in routing_table(&config.topics) {
        println!("{}", line);
    }

    Ok(())
}
