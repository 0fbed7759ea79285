//! The deployment engine.
//!
//! Wraps a provider, a deployment store and an artifact resolver behind the
//! operations migration scripts are written against: named lookups,
//! idempotent deploys and a guard for scripts that only apply to one
//! network family.

use crate::artifact::{
    ArtifactResolver,
    Deployment,
    constructor_arg_json,
};
use crate::error::{
    DeployError,
    DeployResult,
};
use crate::store::DeploymentStore;
use alloy_dyn_abi::{
    DynSolValue,
    JsonAbiExt,
};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{
    Address,
    B256,
};
use alloy_provider::{
    Provider,
    RootProvider,
    ext::AnvilApi,
    network::TransactionBuilder,
};
use alloy_rpc_types::{
    TransactionReceipt,
    TransactionRequest,
};
use emptyset_common::{
    DeployerAccount,
    Network,
};
use std::time::Duration;
use tracing::{
    debug,
    info,
};

const RECEIPT_POLL_ATTEMPTS: usize = 40;
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Options for a single named deploy.
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Artifact to deploy from when it differs from the deployment name.
    pub contract: Option<String>,
    pub args: Vec<DynSolValue>,
    /// Sender account, defaulting to the engine's deployer.
    pub from: Option<Address>,
    /// Reuse an existing record instead of redeploying.
    pub skip_if_already_deployed: bool,
    pub log: bool,
    /// Mine a block right after submitting, for local simulators that run
    /// with automine disabled.
    pub auto_mine: bool,
}

/// What a [`Deployer::deploy`] call resolved to.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub address: Address,
    pub deployment: Deployment,
    /// False when an existing record was reused.
    pub newly_deployed: bool,
}

#[derive(Debug, Clone)]
pub struct Deployer {
    provider: RootProvider,
    network: Network,
    store: DeploymentStore,
    artifacts: ArtifactResolver,
    deployer: Address,
}

impl Deployer {
    /// Verifies the node matches `network`, resolves the deployer account
    /// and returns a ready engine.
    ///
    /// Index-based accounts are resolved against the node's unlocked
    /// accounts, so signing stays node-side.
    pub async fn connect(
        provider: RootProvider,
        network: Network,
        store: DeploymentStore,
        artifacts: ArtifactResolver,
        account: DeployerAccount,
    ) -> DeployResult<Self> {
        let chain_id = provider.get_chain_id().await?;
        // Forks keep the upstream chain id, so only remote networks are
        // pinned to theirs.
        if !network.is_local() && chain_id != network.chain_id() {
            return Err(DeployError::ChainIdMismatch {
                network,
                expected: network.chain_id(),
                actual: chain_id,
            });
        }

        let deployer = match account {
            DeployerAccount::Address(address) => address,
            DeployerAccount::Index(index) => {
                let accounts = provider.get_accounts().await?;
                accounts
                    .get(index)
                    .copied()
                    .ok_or(DeployError::MissingAccount {
                        index,
                        count: accounts.len(),
                    })?
            }
        };

        info!(network = %network, deployer = %deployer, "deployment engine connected");
        Ok(Self {
            provider,
            network,
            store,
            artifacts,
            deployer,
        })
    }

    pub fn provider(&self) -> &RootProvider {
        &self.provider
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// The account deploys are sent from.
    pub fn address(&self) -> Address {
        self.deployer
    }

    pub fn store(&self) -> &DeploymentStore {
        &self.store
    }

    /// The deployment recorded under `name`, or an error naming it.
    pub fn get(&self, name: &str) -> DeployResult<Deployment> {
        self.store.get(name)
    }

    pub fn get_opt(&self, name: &str) -> DeployResult<Option<Deployment>> {
        self.store.get_opt(name)
    }

    /// Deploys the artifact behind `name` and records the result.
    ///
    /// With `skip_if_already_deployed`, an existing record short-circuits
    /// the whole flow and is returned as-is.
    pub async fn deploy(
        &self,
        name: &str,
        options: DeployOptions,
    ) -> DeployResult<DeployOutcome> {
        if options.skip_if_already_deployed
            && let Some(existing) = self.store.get_opt(name)?
        {
            if options.log {
                info!(name, address = %existing.address, "reusing existing deployment");
            }
            return Ok(DeployOutcome {
                address: existing.address,
                deployment: existing,
                newly_deployed: false,
            });
        }

        let contract = options.contract.as_deref().unwrap_or(name);
        let artifact = self.artifacts.load(contract)?;
        let creation = artifact.bytecode_bytes()?;

        let mut code = creation.to_vec();
        code.extend(encode_constructor_args(
            contract,
            &artifact.abi,
            &options.args,
        )?);

        let from = options.from.unwrap_or(self.deployer);
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_deploy_code(code);

        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        debug!(name, contract, %tx_hash, "submitted deploy transaction");

        if options.auto_mine && self.network.is_local() {
            let _ = self.provider.evm_mine(None).await?;
        }

        let receipt = self.wait_for_receipt(tx_hash).await?;
        if !receipt.status() {
            return Err(DeployError::Reverted { tx_hash });
        }
        let address = receipt
            .contract_address
            .ok_or(DeployError::MissingContractAddress { tx_hash })?;

        let deployed_bytecode = artifact
            .deployed_bytecode
            .as_ref()
            .and_then(|bytecode| bytecode.to_bytes().ok());
        let deployment = Deployment {
            address,
            abi: artifact.abi,
            transaction_hash: Some(tx_hash),
            block_number: receipt.block_number,
            args: options.args.iter().map(constructor_arg_json).collect(),
            num_deployments: 1,
            bytecode: Some(creation),
            deployed_bytecode,
            receipt: serde_json::to_value(&receipt).ok(),
        };
        self.store.save(name, &deployment)?;

        if options.log {
            info!(
                name,
                contract,
                address = %address,
                gas_used = receipt.gas_used,
                "deployed"
            );
        }
        Ok(DeployOutcome {
            address,
            deployment,
            newly_deployed: true,
        })
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> DeployResult<TransactionReceipt> {
        for _ in 0..RECEIPT_POLL_ATTEMPTS {
            if let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
        Err(DeployError::ReceiptTimeout {
            tx_hash,
            attempts: RECEIPT_POLL_ATTEMPTS,
        })
    }
}

/// Guard for migrations that only apply to one network family.
pub fn ensure_network(
    network: Network,
    expected: &'static str,
    allowed: impl Fn(Network) -> bool,
) -> DeployResult {
    if allowed(network) {
        Ok(())
    } else {
        Err(DeployError::WrongNetwork {
            expected,
            actual: network,
        })
    }
}

fn encode_constructor_args(
    contract: &str,
    abi: &JsonAbi,
    args: &[DynSolValue],
) -> DeployResult<Vec<u8>> {
    let Some(constructor) = abi.constructor() else {
        return if args.is_empty() {
            Ok(Vec::new())
        } else {
            Err(DeployError::ConstructorArity {
                contract: contract.to_string(),
                expected: 0,
                actual: args.len(),
            })
        };
    };
    if constructor.inputs.len() != args.len() {
        return Err(DeployError::ConstructorArity {
            contract: contract.to_string(),
            expected: constructor.inputs.len(),
            actual: args.len(),
        });
    }
    constructor.abi_encode_input(args).map_err(|source| {
        DeployError::AbiEncode {
            contract: contract.to_string(),
            source,
        }
    })
}
