//! Shared building blocks for the Emptyset deployment tooling: the network
//! taxonomy and the per-package configuration model.

pub mod config;
pub mod error;
pub mod network;

pub use config::{
    DeployerAccount,
    ForkConfig,
    PackageConfig,
};
pub use error::{
    ConfigError,
    ConfigResult,
};
pub use network::Network;
