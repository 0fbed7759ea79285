//! Network taxonomy for the Emptyset packages.
//!
//! Every deployment registry directory, external artifact lookup and RPC
//! endpoint is keyed by one of these networks. The canonical spelling
//! (`optimismGoerli`, `arbitrumSepolia`, ...) doubles as the on-disk
//! directory name, so `Display` must stay in sync with the registry layout.

use crate::error::ConfigError;
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Network {
    Mainnet,
    Goerli,
    Kovan,
    Optimism,
    OptimismGoerli,
    Arbitrum,
    ArbitrumGoerli,
    ArbitrumSepolia,
    Base,
    BaseGoerli,
    /// In-process simulator (anvil). Accepts `hardhat` as a legacy alias.
    Anvil,
    Localhost,
}

impl Network {
    /// Every known network, in registry order.
    pub const ALL: [Network; 12] = [
        Network::Mainnet,
        Network::Goerli,
        Network::Kovan,
        Network::Optimism,
        Network::OptimismGoerli,
        Network::Arbitrum,
        Network::ArbitrumGoerli,
        Network::ArbitrumSepolia,
        Network::Base,
        Network::BaseGoerli,
        Network::Anvil,
        Network::Localhost,
    ];

    /// Canonical registry key; also the deployment directory name.
    pub const fn key(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Goerli => "goerli",
            Network::Kovan => "kovan",
            Network::Optimism => "optimism",
            Network::OptimismGoerli => "optimismGoerli",
            Network::Arbitrum => "arbitrum",
            Network::ArbitrumGoerli => "arbitrumGoerli",
            Network::ArbitrumSepolia => "arbitrumSepolia",
            Network::Base => "base",
            Network::BaseGoerli => "baseGoerli",
            Network::Anvil => "anvil",
            Network::Localhost => "localhost",
        }
    }

    pub const fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => 1,
            Network::Goerli => 5,
            Network::Kovan => 42,
            Network::Optimism => 10,
            Network::OptimismGoerli => 420,
            Network::Arbitrum => 42161,
            Network::ArbitrumGoerli => 421613,
            Network::ArbitrumSepolia => 421614,
            Network::Base => 8453,
            Network::BaseGoerli => 84531,
            Network::Anvil | Network::Localhost => 31337,
        }
    }

    pub const fn is_optimism(&self) -> bool {
        matches!(self, Network::Optimism | Network::OptimismGoerli)
    }

    pub const fn is_arbitrum(&self) -> bool {
        matches!(
            self,
            Network::Arbitrum | Network::ArbitrumGoerli | Network::ArbitrumSepolia
        )
    }

    pub const fn is_base(&self) -> bool {
        matches!(self, Network::Base | Network::BaseGoerli)
    }

    pub const fn is_testnet(&self) -> bool {
        matches!(
            self,
            Network::Goerli
                | Network::Kovan
                | Network::OptimismGoerli
                | Network::ArbitrumGoerli
                | Network::ArbitrumSepolia
                | Network::BaseGoerli
        )
    }

    /// True for the local simulator and a locally exposed node.
    pub const fn is_local(&self) -> bool {
        matches!(self, Network::Anvil | Network::Localhost)
    }

    /// Environment variable consulted for this network's RPC endpoint.
    pub fn rpc_url_env_var(&self) -> String {
        match self {
            Network::OptimismGoerli => "OPTIMISM_GOERLI_NODE_URL".to_string(),
            Network::ArbitrumGoerli => "ARBITRUM_GOERLI_NODE_URL".to_string(),
            Network::ArbitrumSepolia => "ARBITRUM_SEPOLIA_NODE_URL".to_string(),
            Network::BaseGoerli => "BASE_GOERLI_NODE_URL".to_string(),
            other => format!("{}_NODE_URL", other.key().to_uppercase()),
        }
    }

    /// Endpoint assumed when no environment variable is set. Only local
    /// networks have one; remote networks must be configured explicitly.
    pub const fn default_rpc_url(&self) -> Option<&'static str> {
        if self.is_local() {
            Some("http://127.0.0.1:8545")
        } else {
            None
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Registry keys are camelCase; accept kebab/snake spellings too.
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect();
        match normalized.as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "goerli" => Ok(Network::Goerli),
            "kovan" => Ok(Network::Kovan),
            "optimism" => Ok(Network::Optimism),
            "optimismgoerli" => Ok(Network::OptimismGoerli),
            "arbitrum" => Ok(Network::Arbitrum),
            "arbitrumgoerli" => Ok(Network::ArbitrumGoerli),
            "arbitrumsepolia" => Ok(Network::ArbitrumSepolia),
            "base" => Ok(Network::Base),
            "basegoerli" => Ok(Network::BaseGoerli),
            "anvil" | "hardhat" => Ok(Network::Anvil),
            "localhost" => Ok(Network::Localhost),
            _ => {
                Err(ConfigError::UnknownNetwork(format!(
                    "unknown network '{s}'; valid networks are: {}",
                    Network::ALL.map(|n| n.key()).join(", ")
                )))
            }
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// Networks appear as plain strings in config files (including as map keys),
// so serde goes through Display/FromStr rather than the derived form.
impl Serialize for Network {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
