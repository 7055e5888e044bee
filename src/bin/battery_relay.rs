use battery_relay::cli::{commands, Cli, Commands};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => commands::execute_init(args)?,
        Commands::Run(args) => commands::execute_run(args).await?,
        Commands::Check(args) => commands::execute_check(args)?,
    }

    Ok(())
}
