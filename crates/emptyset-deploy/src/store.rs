//! Per-network storage for deployment records.
//!
//! Records live under `<root>/deployments/<network>/<Name>.json` next to a
//! `.chainId` marker that pins the directory to one chain. Lookups fall
//! back to the configured external deployments directories, which are
//! never written to.

use crate::artifact::Deployment;
use crate::error::{
    DeployError,
    DeployResult,
};
use alloy_primitives::Address;
use emptyset_common::Network;
use std::collections::BTreeSet;
use std::path::{
    Path,
    PathBuf,
};
use tracing::debug;

const CHAIN_ID_MARKER: &str = ".chainId";

#[derive(Debug, Clone)]
pub struct DeploymentStore {
    network: Network,
    dir: PathBuf,
    externals: Vec<PathBuf>,
}

impl DeploymentStore {
    /// Opens the store rooted at `package_root` for `network`. Directories
    /// are created lazily on first save.
    pub fn open(
        package_root: &Path,
        network: Network,
        externals: Vec<PathBuf>,
    ) -> Self {
        Self {
            network,
            dir: emptyset_common::config::deployments_dir(package_root, network),
            externals,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The deployment for `name`, or [`DeployError::UnknownDeployment`].
    pub fn get(&self, name: &str) -> DeployResult<Deployment> {
        self.get_opt(name)?.ok_or_else(|| {
            DeployError::UnknownDeployment {
                name: name.to_string(),
                network: self.network,
            }
        })
    }

    /// Local records shadow external ones of the same name.
    pub fn get_opt(&self, name: &str) -> DeployResult<Option<Deployment>> {
        let file = format!("{name}.json");
        for dir in std::iter::once(&self.dir).chain(self.externals.iter()) {
            let path = dir.join(&file);
            if path.is_file() {
                return Deployment::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    pub fn address_of(&self, name: &str) -> DeployResult<Address> {
        Ok(self.get(name)?.address)
    }

    /// Records `deployment` under `name`, bumping the deployment counter
    /// when a record of the same name already exists locally.
    pub fn save(&self, name: &str, deployment: &Deployment) -> DeployResult {
        std::fs::create_dir_all(&self.dir).map_err(|source| {
            DeployError::Io {
                path: self.dir.clone(),
                source,
            }
        })?;
        self.write_chain_marker()?;

        let path = self.dir.join(format!("{name}.json"));
        let mut record = deployment.clone();
        record.num_deployments = if path.is_file() {
            Deployment::from_file(&path)?.num_deployments.saturating_add(1)
        } else {
            record.num_deployments.max(1)
        };

        record.to_file(&path)?;
        debug!(name, path = %path.display(), "saved deployment record");
        Ok(())
    }

    /// Names with a record on this network, local and external, sorted and
    /// deduplicated.
    pub fn list(&self) -> DeployResult<Vec<String>> {
        let mut names = BTreeSet::new();
        for dir in std::iter::once(&self.dir).chain(self.externals.iter()) {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json")
                    && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
                    && !stem.starts_with('.')
                {
                    names.insert(stem.to_string());
                }
            }
        }
        Ok(names.into_iter().collect())
    }

    /// The chain id recorded in the directory marker, if the directory has
    /// been written to before.
    pub fn chain_id_marker(&self) -> DeployResult<Option<u64>> {
        let path = self.dir.join(CHAIN_ID_MARKER);
        if !path.is_file() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| {
            DeployError::Io {
                path: path.clone(),
                source,
            }
        })?;
        raw.trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|source| DeployError::BadMarker { path, source })
    }

    fn write_chain_marker(&self) -> DeployResult {
        let expected = self.network.chain_id();
        match self.chain_id_marker()? {
            Some(recorded) if recorded != expected => {
                Err(DeployError::MarkerMismatch {
                    path: self.dir.join(CHAIN_ID_MARKER),
                    recorded,
                    expected,
                })
            }
            Some(_) => Ok(()),
            None => {
                let path = self.dir.join(CHAIN_ID_MARKER);
                std::fs::write(&path, expected.to_string()).map_err(|source| {
                    DeployError::Io { path, source }
                })
            }
        }
    }
}
