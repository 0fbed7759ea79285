//! Engine behavior against the recording mock node, plus one ignored
//! round-trip against a real anvil instance.

mod common;

use alloy_primitives::{
    U256,
    address,
    hex,
};
use alloy_provider::{
    Provider,
    network::TransactionBuilder,
};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolValue;
use emptyset_common::{
    DeployerAccount,
    Network,
};
use emptyset_deploy::{
    ArtifactResolver,
    DeployError,
    DeployOptions,
    Deployer,
    DeploymentStore,
    MigrationRunner,
};
use emptyset_testutil::MockRpcNode;

#[tokio::test(flavor = "multi_thread")]
async fn connect_rejects_a_node_on_the_wrong_chain() {
    let node = MockRpcNode::start_with_chain_id(1).await.unwrap();
    let root = tempfile::tempdir().unwrap();
    let err = Deployer::connect(
        common::provider_for(&node),
        Network::Optimism,
        DeploymentStore::open(root.path(), Network::Optimism, Vec::new()),
        ArtifactResolver::default(),
        DeployerAccount::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        DeployError::ChainIdMismatch {
            expected: 10,
            actual: 1,
            ..
        }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn connect_resolves_the_indexed_deployer_account() {
    let harness = common::harness(Network::Anvil, Vec::new()).await;
    assert_eq!(harness.deployer.address(), harness.node.account(0));
}

#[tokio::test(flavor = "multi_thread")]
async fn deploy_records_once_and_reuses_after() {
    let harness = common::harness(Network::Anvil, Vec::new()).await;
    let options = DeployOptions {
        skip_if_already_deployed: true,
        log: true,
        auto_mine: true,
        ..DeployOptions::default()
    };

    let first = harness
        .deployer
        .deploy("Registry", options.clone())
        .await
        .unwrap();
    assert!(first.newly_deployed);
    assert_eq!(harness.node.sent_transactions().len(), 1);
    // Automine kicks in on the local simulator.
    assert_eq!(harness.node.calls_of("evm_mine").len(), 1);

    let record_path = harness
        .root
        .path()
        .join("deployments/anvil/Registry.json");
    assert!(record_path.is_file());
    assert_eq!(
        std::fs::read_to_string(harness.root.path().join("deployments/anvil/.chainId"))
            .unwrap()
            .trim(),
        "31337"
    );

    let second = harness.deployer.deploy("Registry", options).await.unwrap();
    assert!(!second.newly_deployed);
    assert_eq!(second.address, first.address);
    // No second transaction went out.
    assert_eq!(harness.node.sent_transactions().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn deploy_sends_creation_code_with_encoded_constructor_args() {
    let harness = common::harness(Network::Anvil, Vec::new()).await;
    let dsu = address!("0x605D26FBd5be761089281d5cec2Ce86eeA667109");
    let usdc = address!("0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85");
    let bridged = address!("0x7F5c764cBc14f9669B88837ca1490cCa17c31607");

    let outcome = harness
        .deployer
        .deploy(
            "MigrationReserveImpl",
            DeployOptions {
                contract: Some("MigrationReserve".to_string()),
                args: vec![dsu.into(), usdc.into(), bridged.into()],
                ..DeployOptions::default()
            },
        )
        .await
        .unwrap();
    assert!(outcome.newly_deployed);

    let sent = harness.node.sent_transactions();
    assert_eq!(sent.len(), 1);
    let tx = &sent[0];
    // A deploy carries no recipient and is sent from the deployer account.
    assert!(tx.get("to").is_none_or(serde_json::Value::is_null));
    assert_eq!(
        tx["from"].as_str().unwrap().to_lowercase(),
        format!("{:#x}", harness.node.account(0))
    );

    let input = tx
        .get("input")
        .or_else(|| tx.get("data"))
        .and_then(|value| value.as_str())
        .unwrap();
    assert!(input.starts_with("0x60e06040"));
    assert!(input.ends_with(&hex::encode((dsu, usdc, bridged).abi_encode())));

    // The record keeps the arguments in portable form.
    let record = harness.deployer.get("MigrationReserveImpl").unwrap();
    assert_eq!(record.args[0], serde_json::json!(dsu.to_checksum(None)));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_artifacts_and_accounts_surface_by_name() {
    let harness = common::harness(Network::Anvil, Vec::new()).await;

    let err = harness
        .deployer
        .deploy("Nonexistent", DeployOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DeployError::MissingArtifact { name, .. } if name == "Nonexistent"
    ));

    let node = MockRpcNode::start().await.unwrap();
    let root = tempfile::tempdir().unwrap();
    let err = Deployer::connect(
        common::provider_for(&node),
        Network::Anvil,
        DeploymentStore::open(root.path(), Network::Anvil, Vec::new()),
        ArtifactResolver::default(),
        DeployerAccount::Index(7),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        DeployError::MissingAccount { index: 7, count: 2 }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn the_optimism_migration_deploys_the_reserve_behind_existing_tokens() {
    let harness = common::harness(
        Network::Optimism,
        vec![common::testdata("deployments/optimism")],
    )
    .await;
    let runner = MigrationRunner::standard();

    runner
        .run_tag(&harness.deployer, "Deploy_MigrationReserve_Optimism")
        .await
        .unwrap();

    let record = harness.deployer.get("MigrationReserveImpl").unwrap();
    assert_eq!(
        record.args,
        vec![
            serde_json::json!("0x605D26FBd5be761089281d5cec2Ce86eeA667109"),
            serde_json::json!("0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"),
            serde_json::json!("0x7F5c764cBc14f9669B88837ca1490cCa17c31607"),
        ]
    );
    // Optimism is not a local simulator, so automine stays off.
    assert!(harness.node.calls_of("evm_mine").is_empty());

    // Rerunning is a no-op thanks to skip_if_already_deployed.
    runner
        .run_tag(&harness.deployer, "Deploy_MigrationReserve_Optimism")
        .await
        .unwrap();
    assert_eq!(harness.node.sent_transactions().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn the_optimism_migration_refuses_other_networks() {
    let harness = common::harness(Network::Arbitrum, Vec::new()).await;
    let err = MigrationRunner::standard()
        .run_tag(&harness.deployer, "Deploy_MigrationReserve_Optimism")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DeployError::WrongNetwork {
            expected: "Optimism",
            actual: Network::Arbitrum,
        }
    ));
    assert_eq!(
        err.to_string(),
        "this migration is only for Optimism, not arbitrum"
    );
    // The guard fires before any lookup or transaction.
    assert!(harness.node.sent_transactions().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_tags_and_missing_dependencies_are_errors() {
    let harness = common::harness(Network::Optimism, Vec::new()).await;
    let runner = MigrationRunner::standard();

    assert!(matches!(
        runner
            .run_tag(&harness.deployer, "Deploy_Everything")
            .await
            .unwrap_err(),
        DeployError::UnknownTag(tag) if tag == "Deploy_Everything"
    ));

    // Without the external token records the migration cannot start.
    assert!(matches!(
        runner
            .run_tag(&harness.deployer, "Deploy_MigrationReserve_Optimism")
            .await
            .unwrap_err(),
        DeployError::UnknownDeployment { name, network }
            if name == "DSU" && network == Network::Optimism
    ));
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "needs the anvil binary on PATH"]
async fn full_flow_against_a_real_anvil_node() {
    let (anvil, provider) = emptyset_testutil::spawn().await.unwrap();

    let root = tempfile::tempdir().unwrap();
    let deployer = Deployer::connect(
        provider.clone(),
        Network::Anvil,
        DeploymentStore::open(root.path(), Network::Anvil, Vec::new()),
        ArtifactResolver::new(vec![common::testdata("artifacts")]),
        DeployerAccount::default(),
    )
    .await
    .unwrap();

    let outcome = deployer
        .deploy("Noop", DeployOptions { log: true, ..DeployOptions::default() })
        .await
        .unwrap();
    assert!(outcome.newly_deployed);
    assert!(root.path().join("deployments/anvil/Noop.json").is_file());

    // Chain helpers run against the same node.
    let before = emptyset_testutil::time::current_timestamp(&provider)
        .await
        .unwrap();
    emptyset_testutil::time::mine_blocks(&provider, 3).await.unwrap();
    emptyset_testutil::time::increase_time(&provider, 3600)
        .await
        .unwrap();
    let after = emptyset_testutil::time::current_timestamp(&provider)
        .await
        .unwrap();
    assert!(after >= before + 3600);

    // An impersonated whale can spend once funded.
    let whale = address!("0x28C6c06298d514Db089934071355E5743bf21d60");
    emptyset_testutil::impersonate::impersonate_funded(
        &provider,
        whale,
        U256::from(10).pow(U256::from(18)),
    )
    .await
    .unwrap();
    let tx = TransactionRequest::default()
        .with_from(whale)
        .with_to(anvil.addresses()[0])
        .with_value(U256::from(1));
    let pending = provider.send_transaction(tx).await.unwrap();
    let receipt = provider
        .get_transaction_receipt(*pending.tx_hash())
        .await
        .unwrap()
        .expect("transfer mined");
    assert!(receipt.status());

    drop(anvil);
}
