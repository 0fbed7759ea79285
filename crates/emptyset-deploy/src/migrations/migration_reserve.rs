//! Deploys the MigrationReserve implementation behind the existing token
//! deployments, once per rollup.

use crate::deployer::{
    DeployOptions,
    Deployer,
    ensure_network,
};
use crate::error::DeployResult;
use alloy_dyn_abi::DynSolValue;
use async_trait::async_trait;
use emptyset_common::Network;
use tracing::info;

use super::Migration;

/// MigrationReserve rollout for the Optimism networks.
pub struct MigrationReserveOptimism;

#[async_trait]
impl Migration for MigrationReserveOptimism {
    fn name(&self) -> &'static str {
        "004_optimism_deploy_migration_reserve"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["Deploy_MigrationReserve_Optimism"]
    }

    async fn run(&self, deployer: &Deployer) -> DeployResult {
        ensure_network(deployer.network(), "Optimism", Network::is_optimism)?;
        deploy_migration_reserve(deployer).await
    }
}

/// MigrationReserve rollout for the Arbitrum networks.
pub struct MigrationReserveArbitrum;

#[async_trait]
impl Migration for MigrationReserveArbitrum {
    fn name(&self) -> &'static str {
        "005_arbitrum_deploy_migration_reserve"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["Deploy_MigrationReserve_Arbitrum"]
    }

    async fn run(&self, deployer: &Deployer) -> DeployResult {
        ensure_network(deployer.network(), "Arbitrum", Network::is_arbitrum)?;
        deploy_migration_reserve(deployer).await
    }
}

// The reserve implementation takes the already-deployed token addresses as
// constructor arguments. The proxy wiring happens in a later migration.
async fn deploy_migration_reserve(deployer: &Deployer) -> DeployResult {
    let dsu = deployer.get("DSU")?;
    info!(address = %dsu.address, "using DSU");
    let usdc = deployer.get("USDC")?;
    info!(address = %usdc.address, "using USDC");
    let usdc_bridged = deployer.get("USDCBridged")?;
    info!(address = %usdc_bridged.address, "using USDCBridged");

    deployer
        .deploy(
            "MigrationReserveImpl",
            DeployOptions {
                contract: Some("MigrationReserve".to_string()),
                args: vec![
                    DynSolValue::Address(dsu.address),
                    DynSolValue::Address(usdc.address),
                    DynSolValue::Address(usdc_bridged.address),
                ],
                skip_if_already_deployed: true,
                log: true,
                auto_mine: true,
                ..DeployOptions::default()
            },
        )
        .await?;
    Ok(())
}
