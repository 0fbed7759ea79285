mod cli;
mod commands;

use crate::cli::{
    Cli,
    Commands,
    DeploymentsCommand,
};
use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::{
    EnvFilter,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install()?;
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Deploy(args) => commands::deploy(args).await?,
        Commands::Deployments(DeploymentsCommand::List(args)) => commands::list(args)?,
        Commands::Deployments(DeploymentsCommand::Show(args)) => commands::show(args)?,
    }
    Ok(())
}
