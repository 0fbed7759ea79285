//! Deployment records and compiler artifacts.
//!
//! A deployment record is one JSON file per contract name per network,
//! written by [`crate::store::DeploymentStore`] and shared with other
//! packages through their external deployments directories. A compiler
//! artifact is the build output the engine deploys from, in either the
//! flat-bytecode or the nested `{ "object": .. }` shape depending on which
//! toolchain produced it.

use crate::error::{
    DeployError,
    DeployResult,
};
use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{
    Address,
    B256,
    Bytes,
    hex,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Value,
    json,
};
use std::path::{
    Path,
    PathBuf,
};

/// A recorded contract deployment.
///
/// Unknown fields are tolerated so records written by other toolchains can
/// be read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub address: Address,
    pub abi: JsonAbi,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(default)]
    pub num_deployments: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_bytecode: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Value>,
}

impl Deployment {
    /// A minimal record, as produced for contracts adopted from elsewhere
    /// rather than deployed by the engine.
    pub fn adopted(address: Address, abi: JsonAbi) -> Self {
        Self {
            address,
            abi,
            transaction_hash: None,
            block_number: None,
            args: Vec::new(),
            num_deployments: 1,
            bytecode: None,
            deployed_bytecode: None,
            receipt: None,
        }
    }

    pub fn from_file(path: &Path) -> DeployResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| {
            DeployError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        serde_json::from_str(&raw).map_err(|source| {
            DeployError::Json {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn to_file(&self, path: &Path) -> DeployResult {
        let rendered = serde_json::to_string_pretty(self).map_err(|source| {
            DeployError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        std::fs::write(path, rendered).map_err(|source| {
            DeployError::Io {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

/// Compiler output for a single contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,
    pub abi: JsonAbi,
    pub bytecode: BytecodeObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_bytecode: Option<BytecodeObject>,
}

impl ContractArtifact {
    pub fn from_file(path: &Path) -> DeployResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| {
            DeployError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        serde_json::from_str(&raw).map_err(|source| {
            DeployError::Json {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Creation bytecode as bytes, rejecting artifacts that still need
    /// library linking.
    pub fn bytecode_bytes(&self) -> DeployResult<Bytes> {
        let name = self.contract_name.as_deref().unwrap_or("unknown");
        if !self.bytecode.is_linked() {
            return Err(DeployError::UnlinkedBytecode {
                name: name.to_string(),
            });
        }
        self.bytecode.to_bytes().map_err(|source| {
            DeployError::InvalidBytecode {
                name: name.to_string(),
                source,
            }
        })
    }
}

/// Creation bytecode, either as a bare hex string or nested under an
/// `object` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BytecodeObject {
    Flat(String),
    Nested { object: String },
}

impl BytecodeObject {
    pub fn raw(&self) -> &str {
        match self {
            Self::Flat(raw) | Self::Nested { object: raw } => raw,
        }
    }

    /// False while the bytecode still carries `__$...$__` library
    /// placeholders.
    pub fn is_linked(&self) -> bool {
        !self.raw().contains("__$")
    }

    pub fn to_bytes(&self) -> Result<Bytes, hex::FromHexError> {
        hex::decode(self.raw()).map(Bytes::from)
    }
}

/// Locates compiler artifacts across the configured artifact directories.
///
/// Each directory is probed for the `<Name>.sol/<Name>.json` layout first
/// and the flat `<Name>.json` layout second, in directory order.
#[derive(Debug, Clone, Default)]
pub struct ArtifactResolver {
    dirs: Vec<PathBuf>,
}

impl ArtifactResolver {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn push_dir(&mut self, dir: impl Into<PathBuf>) {
        self.dirs.push(dir.into());
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn load(&self, name: &str) -> DeployResult<ContractArtifact> {
        for candidate in self.candidates(name) {
            if candidate.is_file() {
                let mut artifact = ContractArtifact::from_file(&candidate)?;
                // Forge artifacts carry no contractName; fall back to the
                // name the resolver was asked for.
                artifact.contract_name.get_or_insert_with(|| name.to_string());
                return Ok(artifact);
            }
        }
        Err(DeployError::MissingArtifact {
            name: name.to_string(),
            searched: self.dirs.clone(),
        })
    }

    fn candidates(&self, name: &str) -> impl Iterator<Item = PathBuf> + '_ {
        let name = name.to_string();
        self.dirs.iter().flat_map(move |dir| {
            [
                dir.join(format!("{name}.sol")).join(format!("{name}.json")),
                dir.join(format!("{name}.json")),
            ]
        })
    }
}

/// Renders a constructor argument the way it is recorded in a deployment
/// file. Addresses keep their checksum form, numbers become decimal
/// strings so precision survives the trip through JSON.
pub fn constructor_arg_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Address(address) => json!(address.to_checksum(None)),
        DynSolValue::Bool(value) => json!(value),
        DynSolValue::Uint(value, _) => json!(value.to_string()),
        DynSolValue::Int(value, _) => json!(value.to_string()),
        DynSolValue::String(value) => json!(value),
        DynSolValue::Bytes(bytes) => json!(hex::encode_prefixed(bytes)),
        DynSolValue::FixedBytes(word, size) => json!(hex::encode_prefixed(&word[..*size])),
        DynSolValue::Array(values)
        | DynSolValue::FixedArray(values)
        | DynSolValue::Tuple(values) => {
            Value::Array(values.iter().map(constructor_arg_json).collect())
        }
        other => json!(format!("{other:?}")),
    }
}
