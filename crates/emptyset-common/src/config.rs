//! Per-package configuration: which external deployment registries each
//! package consumes, which dependency contract sources it compiles against,
//! and how a local fork is set up.
//!
//! The two built-in packages mirror each other: the DSU package reads the
//! reserve package's published artifacts and vice versa. Package roots are
//! located through an environment override or a sibling checkout; for the
//! DSU package that resolution is best-effort because the reserve is only a
//! dev dependency and may be absent.

use crate::error::{
    ConfigError,
    ConfigResult,
};
use crate::network::Network;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};
use tracing::debug;
use url::Url;

/// Package name of the DSU token package.
pub const DSU_PACKAGE: &str = "dsu";
/// Package name of the reserve package.
pub const RESERVE_PACKAGE: &str = "reserve";

/// Identity used to send deployment transactions.
///
/// Either a position in the node's unlocked account list (index 0 is the
/// conventional deployer) or an explicit address, e.g. an impersonated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeployerAccount {
    Index(usize),
    Address(alloy_primitives::Address),
}

impl Default for DeployerAccount {
    fn default() -> Self {
        DeployerAccount::Index(0)
    }
}

/// Fork settings for the local simulator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: Option<Url>,
    #[serde(default)]
    pub block_number: Option<u64>,
}

impl ForkConfig {
    /// Read fork settings from `FORK_ENABLED`, `FORK_URL` and
    /// `FORK_BLOCK_NUMBER`.
    pub fn from_env() -> ConfigResult<Self> {
        let enabled = match std::env::var("FORK_ENABLED") {
            Ok(raw) => matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes"),
            Err(_) => false,
        };
        let url = match std::env::var("FORK_URL") {
            Ok(raw) => {
                Some(Url::parse(&raw).map_err(|err| {
                    ConfigError::InvalidEnvVar {
                        var: "FORK_URL".to_string(),
                        reason: err.to_string(),
                    }
                })?)
            }
            Err(_) => None,
        };
        let block_number = match std::env::var("FORK_BLOCK_NUMBER") {
            Ok(raw) => {
                Some(raw.parse::<u64>().map_err(|_| {
                    ConfigError::InvalidEnvVar {
                        var: "FORK_BLOCK_NUMBER".to_string(),
                        reason: format!("expected a block number, got '{raw}'"),
                    }
                })?)
            }
            Err(_) => None,
        };
        Ok(Self {
            enabled,
            url,
            block_number,
        })
    }
}

/// Configuration for one package in the monorepo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageConfig {
    /// Package name, e.g. `dsu` or `reserve`.
    pub package: String,
    /// Per-network directories of artifacts published by other packages.
    #[serde(default)]
    pub external_deployments: BTreeMap<Network, Vec<PathBuf>>,
    /// Dependency contract sources this package compiles against.
    #[serde(default)]
    pub dependency_paths: Vec<PathBuf>,
    #[serde(default)]
    pub fork: ForkConfig,
    #[serde(default)]
    pub deployer: DeployerAccount,
}

impl PackageConfig {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Default::default()
        }
    }

    /// Load a package config from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        config.validate()
    }

    /// Validate the configuration, returning it for chained construction.
    pub fn validate(self) -> ConfigResult<Self> {
        if self.package.trim().is_empty() {
            return Err(ConfigError::Invalid("package name cannot be empty".to_string()));
        }
        if self.fork.enabled && self.fork.url.is_none() {
            return Err(ConfigError::Invalid(
                "fork is enabled but no fork URL is set".to_string(),
            ));
        }
        Ok(self)
    }

    /// External artifact directories consulted for `network`, in priority
    /// order. Unconfigured networks get an empty slice.
    pub fn external_deployments_for(&self, network: Network) -> &[PathBuf] {
        self.external_deployments
            .get(&network)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Deployment registry directory for a package root and network.
pub fn deployments_dir(root: &Path, network: Network) -> PathBuf {
    root.join("deployments").join(network.key())
}

/// Locate a package root, starting from the current directory.
///
/// Checks the `EMPTYSET_<PACKAGE>_ROOT` override first, then the sibling
/// checkout layouts (`../<package>`, `../../packages/<package>`). Absence is
/// not an error; the caller decides whether the package is required.
pub fn resolve_package_root(package: &str) -> Option<PathBuf> {
    let start = std::env::current_dir().ok()?;
    resolve_package_root_from(&start, package)
}

/// [`resolve_package_root`] with an explicit starting directory.
pub fn resolve_package_root_from(start: &Path, package: &str) -> Option<PathBuf> {
    let var = package_root_env_var(package);
    if let Ok(raw) = std::env::var(&var) {
        let path = PathBuf::from(raw);
        if path.is_dir() {
            return Some(path);
        }
        debug!(var = %var, path = %path.display(), "package root override does not exist");
    }

    let candidates = [
        start.join("..").join(package),
        start.join("../..").join("packages").join(package),
    ];
    candidates.into_iter().find(|candidate| candidate.is_dir())
}

fn package_root_env_var(package: &str) -> String {
    format!(
        "EMPTYSET_{}_ROOT",
        package.to_uppercase().replace('-', "_")
    )
}

/// RPC endpoint for `network`: the `<NETWORK>_NODE_URL` variable, or the
/// local default for simulator networks.
pub fn rpc_url(network: Network) -> ConfigResult<Url> {
    let var = network.rpc_url_env_var();
    match std::env::var(&var) {
        Ok(raw) => {
            Url::parse(&raw).map_err(|err| {
                ConfigError::InvalidEnvVar {
                    var,
                    reason: err.to_string(),
                }
            })
        }
        Err(_) => {
            let fallback = network
                .default_rpc_url()
                .ok_or(ConfigError::MissingRpcUrl { network, var: var.clone() })?;
            Url::parse(fallback).map_err(|err| {
                ConfigError::InvalidEnvVar {
                    var,
                    reason: err.to_string(),
                }
            })
        }
    }
}

/// Config for the DSU package.
///
/// The reserve is only a dev dependency, so its root may be absent; the
/// external entries then point at paths that simply do not exist yet.
pub fn dsu_package() -> PackageConfig {
    let reserve_dir = match resolve_package_root(RESERVE_PACKAGE) {
        Some(dir) => dir,
        None => {
            debug!(package = RESERVE_PACKAGE, "package not resolvable, using empty root");
            PathBuf::new()
        }
    };

    let networks = [
        Network::Kovan,
        Network::Goerli,
        Network::OptimismGoerli,
        Network::ArbitrumGoerli,
        Network::Arbitrum,
        Network::Optimism,
        Network::Mainnet,
        Network::Anvil,
        Network::Localhost,
    ];

    PackageConfig {
        package: DSU_PACKAGE.to_string(),
        external_deployments: external_entries(&reserve_dir, &networks),
        dependency_paths: Vec::new(),
        fork: ForkConfig::default(),
        deployer: DeployerAccount::default(),
    }
}

/// Config for the reserve package. The DSU package is a hard dependency.
pub fn reserve_package() -> ConfigResult<PackageConfig> {
    let dsu_dir = resolve_package_root(DSU_PACKAGE)
        .ok_or_else(|| ConfigError::MissingPackage(DSU_PACKAGE.to_string()))?;

    let networks = [
        Network::Kovan,
        Network::Goerli,
        Network::OptimismGoerli,
        Network::ArbitrumGoerli,
        Network::ArbitrumSepolia,
        Network::BaseGoerli,
        Network::Arbitrum,
        Network::Optimism,
        Network::Mainnet,
        Network::Base,
        Network::Anvil,
        Network::Localhost,
    ];

    Ok(PackageConfig {
        package: RESERVE_PACKAGE.to_string(),
        external_deployments: external_entries(&dsu_dir, &networks),
        dependency_paths: vec![
            PathBuf::from("@emptyset/dsu/contracts/DSU.sol"),
            PathBuf::from("@equilibria/root/attribute/CrossChainOwner/CrossChainOwner_Arbitrum.sol"),
            PathBuf::from("@equilibria/root/attribute/CrossChainOwner/CrossChainOwner_Optimism.sol"),
            PathBuf::from("@openzeppelin/contracts/proxy/transparent/TransparentUpgradeableProxy.sol"),
            PathBuf::from("@openzeppelin/contracts/proxy/transparent/ProxyAdmin.sol"),
        ],
        fork: ForkConfig::default(),
        deployer: DeployerAccount::default(),
    })
}

// The simulator reads the peer's mainnet artifacts: local runs fork mainnet.
fn external_entries(base: &Path, networks: &[Network]) -> BTreeMap<Network, Vec<PathBuf>> {
    networks
        .iter()
        .map(|network| {
            let source = match network {
                Network::Anvil => Network::Mainnet,
                other => *other,
            };
            (*network, vec![deployments_dir(base, source)])
        })
        .collect()
}
