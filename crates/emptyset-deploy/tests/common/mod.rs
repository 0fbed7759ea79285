#![allow(dead_code)]
//! Shared harness for the engine integration tests.

use alloy_provider::{
    Provider,
    ProviderBuilder,
    RootProvider,
};
use emptyset_common::{
    DeployerAccount,
    Network,
};
use emptyset_deploy::{
    ArtifactResolver,
    Deployer,
    DeploymentStore,
};
use emptyset_testutil::MockRpcNode;
use std::path::PathBuf;

pub const GREETING: &str = "hello";

pub fn testdata(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(relative)
}

pub fn provider_for(node: &MockRpcNode) -> RootProvider {
    ProviderBuilder::new()
        .connect_http(node.url().parse().unwrap())
        .root()
        .clone()
}

/// A mock node plus an engine wired to it over a throwaway store.
pub struct Harness {
    pub node: MockRpcNode,
    pub root: tempfile::TempDir,
    pub deployer: Deployer,
}

pub async fn harness(network: Network, externals: Vec<PathBuf>) -> Harness {
    let node = MockRpcNode::start_with_chain_id(network.chain_id())
        .await
        .unwrap();
    let root = tempfile::tempdir().unwrap();
    let store = DeploymentStore::open(root.path(), network, externals);
    let artifacts = ArtifactResolver::new(vec![testdata("artifacts")]);
    let deployer = Deployer::connect(
        provider_for(&node),
        network,
        store,
        artifacts,
        DeployerAccount::default(),
    )
    .await
    .unwrap();
    Harness {
        node,
        root,
        deployer,
    }
}
