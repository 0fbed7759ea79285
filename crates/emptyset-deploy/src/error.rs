use alloy_primitives::B256;
use emptyset_common::Network;
use std::path::PathBuf;

/// Errors produced by the deployment engine and the migration scripts.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// A migration asked for a deployment that is not recorded for the
    /// target network, locally or in any external deployments directory.
    #[error("no deployment named `{name}` on {network}")]
    UnknownDeployment { name: String, network: Network },

    #[error("no artifact for `{name}` in {searched:?}")]
    MissingArtifact { name: String, searched: Vec<PathBuf> },

    /// Forge leaves `__$...$__` placeholders in bytecode that still needs
    /// library linking.
    #[error("artifact `{name}` contains unlinked library placeholders")]
    UnlinkedBytecode { name: String },

    #[error("artifact `{name}` has malformed bytecode")]
    InvalidBytecode {
        name: String,
        #[source]
        source: alloy_primitives::hex::FromHexError,
    },

    #[error("constructor of `{contract}` takes {expected} argument(s), got {actual}")]
    ConstructorArity {
        contract: String,
        expected: usize,
        actual: usize,
    },

    #[error("failed to encode constructor arguments for `{contract}`")]
    AbiEncode {
        contract: String,
        #[source]
        source: alloy_dyn_abi::Error,
    },

    #[error("deployer index {index} is not an unlocked account (node exposes {count})")]
    MissingAccount { index: usize, count: usize },

    #[error("node reports chain id {actual}, expected {expected} for {network}")]
    ChainIdMismatch {
        network: Network,
        expected: u64,
        actual: u64,
    },

    /// Directory markers protect deployment records from being mixed across
    /// chains.
    #[error(
        "deployments directory {} belongs to chain {recorded}, expected {expected}",
        path.display()
    )]
    MarkerMismatch {
        path: PathBuf,
        recorded: u64,
        expected: u64,
    },

    #[error("unreadable chain id marker at {}", path.display())]
    BadMarker {
        path: PathBuf,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("this migration is only for {expected}, not {actual}")]
    WrongNetwork {
        expected: &'static str,
        actual: Network,
    },

    #[error("no migration carries the tag `{0}`")]
    UnknownTag(String),

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },

    #[error("no receipt for transaction {tx_hash} after {attempts} poll(s)")]
    ReceiptTimeout { tx_hash: B256, attempts: usize },

    #[error("deploy transaction {tx_hash} produced no contract address")]
    MissingContractAddress { tx_hash: B256 },

    #[error(transparent)]
    Transport(#[from] alloy_transport::TransportError),

    #[error(transparent)]
    Config(#[from] emptyset_common::ConfigError),

    #[error("io failure at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json in {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type DeployResult<T = ()> = Result<T, DeployError>;
