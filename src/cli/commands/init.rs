use anyhow::{bail, Result};

use crate::cli::InitArgs;
use crate::config::Config;

pub fn execute_init(args: InitArgs) -> Result<()> {
    if args.config.exists() && !args.force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            args.config.display()
        );
    }

    let config = Config::default();
    config.save_to_path(&args.config)?;

    eprintln!("Created {}", args.config.display());
    eprintln!("  broker: {}:{}", config.broker.host, config.broker.port);
    eprintln!("  store: {}", config.store.url);
    eprintln!();
    eprintln!("Next: battery-relay run --config {}", args.config.display());

    Ok(())
}
