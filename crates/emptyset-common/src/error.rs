//! Error types for configuration loading and network resolution.

use crate::network::Network;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A package root that must exist could not be resolved.
    #[error(
        "package '{0}' could not be resolved; checked the EMPTYSET_*_ROOT override and sibling checkouts"
    )]
    MissingPackage(String),

    /// An environment variable held a value we could not parse.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    /// No RPC endpoint is known for the requested network.
    #[error("no RPC URL configured for network '{network}'; set {var}")]
    MissingRpcUrl { network: Network, var: String },

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// Reading a configuration file failed.
    #[error("failed to read config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parsing a configuration file failed.
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A network name was not recognized.
    #[error("{0}")]
    UnknownNetwork(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T = ()> = std::result::Result<T, ConfigError>;
