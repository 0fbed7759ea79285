//! End-to-end exercise of the deploy and event plumbing: deploy the
//! greeting registry, update the greeting from a second account, and check
//! both the emitted event and the stored state.

mod common;

use alloy_primitives::hex;
use alloy_provider::{
    Provider,
    network::TransactionBuilder,
};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{
    SolCall,
    SolEvent,
    SolValue,
};
use common::GREETING;
use emptyset_common::Network;
use emptyset_deploy::DeployOptions;
use emptyset_deploy::bindings::Registry;
use serde_json::json;

#[tokio::test(flavor = "multi_thread")]
async fn updating_the_greeting_emits_the_event_and_persists_the_state() {
    let harness = common::harness(Network::Anvil, Vec::new()).await;
    let provider = harness.deployer.provider();

    let registry = harness
        .deployer
        .deploy(
            "Registry",
            DeployOptions {
                log: true,
                auto_mine: true,
                ..DeployOptions::default()
            },
        )
        .await
        .unwrap();
    assert!(registry.newly_deployed);

    // A second account submits the update.
    let user = harness.node.account(1);
    let update = Registry::updateGreetingCall {
        greeting: GREETING.to_string(),
    };
    let tx = TransactionRequest::default()
        .with_from(user)
        .with_to(registry.address)
        .with_input(update.abi_encode());
    let pending = provider.send_transaction(tx).await.unwrap();
    let tx_hash = *pending.tx_hash();

    // The receipt the contract would produce for that update.
    let event = Registry::GreetingUpdated {
        greeting: GREETING.to_string(),
    };
    let log_data = event.encode_log_data();
    harness.node.script(
        "eth_getTransactionReceipt",
        json!({
            "transactionHash": format!("{tx_hash}"),
            "transactionIndex": "0x0",
            "blockHash": format!("0x{:064x}", 2),
            "blockNumber": "0x2",
            "from": format!("{user}"),
            "to": format!("{}", registry.address),
            "cumulativeGasUsed": "0x8a2e",
            "gasUsed": "0x8a2e",
            "contractAddress": null,
            "logs": [{
                "address": format!("{}", registry.address),
                "topics": log_data
                    .topics()
                    .iter()
                    .map(|topic| format!("{topic}"))
                    .collect::<Vec<_>>(),
                "data": format!("{}", log_data.data),
                "blockNumber": "0x2",
                "transactionHash": format!("{tx_hash}"),
                "transactionIndex": "0x0",
                "blockHash": format!("0x{:064x}", 2),
                "logIndex": "0x0",
                "removed": false
            }],
            "logsBloom": format!("0x{:0512}", 0),
            "status": "0x1",
            "effectiveGasPrice": "0x7",
            "type": "0x2"
        }),
    );

    let receipt = provider
        .get_transaction_receipt(tx_hash)
        .await
        .unwrap()
        .expect("update receipt");
    assert!(receipt.status());

    let updated = receipt
        .inner
        .logs()
        .iter()
        .filter(|log| log.address() == registry.address)
        .find_map(|log| Registry::GreetingUpdated::decode_log_data(&log.inner.data).ok())
        .expect("GreetingUpdated event");
    assert_eq!(updated.greeting, GREETING);

    // The greeting reads back through the typed view call.
    harness.node.script(
        "eth_call",
        json!(hex::encode_prefixed(GREETING.to_string().abi_encode())),
    );
    let view = TransactionRequest::default()
        .with_to(registry.address)
        .with_input(Registry::greetingCall {}.abi_encode());
    let raw = provider.call(view).await.unwrap();
    let greeting = Registry::greetingCall::abi_decode_returns(&raw).unwrap();
    assert_eq!(greeting, GREETING);

    // Both transactions went out over the wire, nothing more.
    assert_eq!(harness.node.sent_transactions().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn the_update_calldata_carries_the_selector_and_greeting() {
    let harness = common::harness(Network::Anvil, Vec::new()).await;
    let registry = harness
        .deployer
        .deploy("Registry", DeployOptions::default())
        .await
        .unwrap();

    let update = Registry::updateGreetingCall {
        greeting: GREETING.to_string(),
    };
    let tx = TransactionRequest::default()
        .with_from(harness.deployer.address())
        .with_to(registry.address)
        .with_input(update.abi_encode());
    harness
        .deployer
        .provider()
        .send_transaction(tx)
        .await
        .unwrap();

    let sent = harness.node.sent_transactions();
    let input = sent[1]
        .get("input")
        .or_else(|| sent[1].get("data"))
        .and_then(|value| value.as_str())
        .unwrap();
    assert!(input.starts_with(&hex::encode_prefixed(Registry::updateGreetingCall::SELECTOR)));
    assert!(input.contains(&hex::encode(GREETING)));
}
