use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use vault_gateway::cli::args::{Cli, Command};
use vault_gateway::cli::context::init_configs;
use vault_gateway::config::{LoggingConfig, load_config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Command::Init(args) = &cli.command {
        return init_configs(args);
    }

    let config = load_config(cli.config.clone())?;
    init_tracing(&config.global.logging)?;
    vault_gateway::cli::run(cli, config).await
}

fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .init();
    } else {
        fmt().with_env_filter(filter).init();
    }
    Ok(())
}
