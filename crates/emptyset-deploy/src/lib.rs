//! Deployment engine and migration scripts for the emptyset contracts.
//!
//! The engine deploys compiler artifacts against any configured network,
//! records the results as per-network JSON files and reuses those records
//! on later runs. Migration scripts build on it for the actual rollout
//! sequencing.

pub mod artifact;
pub mod bindings;
pub mod deployer;
pub mod error;
pub mod migrations;
pub mod store;

pub use artifact::{
    ArtifactResolver,
    BytecodeObject,
    ContractArtifact,
    Deployment,
};
pub use deployer::{
    DeployOptions,
    DeployOutcome,
    Deployer,
    ensure_network,
};
pub use error::{
    DeployError,
    DeployResult,
};
pub use migrations::{
    Migration,
    MigrationRunner,
};
pub use store::DeploymentStore;
