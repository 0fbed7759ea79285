//! Command-line surface of the `emptyset` binary.

use clap::{
    Args,
    Parser,
    Subcommand,
};
use emptyset_common::Network;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "emptyset",
    version,
    about = "Deployment tooling for the Emptyset protocol"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run migrations against a network.
    Deploy(DeployArgs),
    /// Inspect recorded deployments.
    #[command(subcommand)]
    Deployments(DeploymentsCommand),
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Target network (mainnet, optimism, arbitrumSepolia, anvil, ...).
    #[arg(long, env = "EMPTYSET_NETWORK")]
    pub network: Network,

    /// Migration tags to run. All registered migrations when omitted.
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Package to deploy (`reserve` or `dsu`), unless an `emptyset.toml`
    /// in the package root overrides the built-in configuration.
    #[arg(long, env = "EMPTYSET_PACKAGE", default_value = "reserve")]
    pub package: String,

    /// RPC endpoint override. Defaults to the network's `*_NODE_URL`
    /// variable, or the local simulator endpoint.
    #[arg(long, env = "EMPTYSET_RPC_URL")]
    pub rpc_url: Option<url::Url>,

    /// Package root holding deployments/ and the artifact directories.
    /// Defaults to the current directory.
    #[arg(long, env = "EMPTYSET_PACKAGE_ROOT")]
    pub package_root: Option<PathBuf>,

    /// Extra artifact directories searched before the package's own.
    #[arg(long = "artifacts")]
    pub artifact_dirs: Vec<PathBuf>,

    /// Deployer account index among the node's unlocked accounts,
    /// overriding the configured deployer.
    #[arg(long)]
    pub deployer_index: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum DeploymentsCommand {
    /// List contract names recorded for a network.
    List(DeploymentsArgs),
    /// Print one recorded deployment as JSON.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct DeploymentsArgs {
    #[arg(long, env = "EMPTYSET_NETWORK")]
    pub network: Network,

    #[arg(long, env = "EMPTYSET_PACKAGE", default_value = "reserve")]
    pub package: String,

    #[arg(long, env = "EMPTYSET_PACKAGE_ROOT")]
    pub package_root: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Deployment name, e.g. MigrationReserveImpl.
    pub name: String,

    #[command(flatten)]
    pub target: DeploymentsArgs,
}
