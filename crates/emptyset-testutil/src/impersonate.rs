//! Account impersonation on the simulator.
//!
//! Impersonated accounts sign node-side, so transactions from them go
//! through the same `eth_sendTransaction` path as unlocked accounts.

use crate::error::TestUtilResult;
use alloy_primitives::{
    Address,
    U256,
};
use alloy_provider::{
    Provider,
    ext::AnvilApi,
};

/// Start impersonating `address`.
pub async fn impersonate<P: Provider>(provider: &P, address: Address) -> TestUtilResult {
    provider.anvil_impersonate_account(address).await?;
    Ok(())
}

/// Fund `address` with `balance`, then start impersonating it. Useful for
/// acting as a contract or a cold account that could not pay for gas.
pub async fn impersonate_funded<P: Provider>(
    provider: &P,
    address: Address,
    balance: U256,
) -> TestUtilResult {
    provider.anvil_set_balance(address, balance).await?;
    impersonate(provider, address).await
}

/// Stop impersonating `address`.
pub async fn stop_impersonating<P: Provider>(provider: &P, address: Address) -> TestUtilResult {
    provider.anvil_stop_impersonating_account(address).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_node::MockRpcNode;
    use alloy_provider::{
        ProviderBuilder,
        RootProvider,
    };
    use alloy_primitives::address;

    fn provider_for(node: &MockRpcNode) -> RootProvider {
        ProviderBuilder::new()
            .connect_http(node.url().parse().unwrap())
            .root()
            .clone()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn impersonation_round_trip() {
        let node = MockRpcNode::start().await.unwrap();
        let provider = provider_for(&node);
        let whale = address!("0x28C6c06298d514Db089934071355E5743bf21d60");

        impersonate(&provider, whale).await.unwrap();
        stop_impersonating(&provider, whale).await.unwrap();

        assert_eq!(node.calls_of("anvil_impersonateAccount").len(), 1);
        assert_eq!(node.calls_of("anvil_stopImpersonatingAccount").len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn funding_happens_before_impersonation() {
        let node = MockRpcNode::start().await.unwrap();
        let provider = provider_for(&node);
        let whale = address!("0x28C6c06298d514Db089934071355E5743bf21d60");

        impersonate_funded(&provider, whale, U256::from(10).pow(U256::from(18)))
            .await
            .unwrap();

        let calls = node.calls();
        let set_balance = calls
            .iter()
            .position(|call| call.method == "anvil_setBalance")
            .unwrap();
        let impersonated = calls
            .iter()
            .position(|call| call.method == "anvil_impersonateAccount")
            .unwrap();
        assert!(set_balance < impersonated);

        // The mock keeps funded balances queryable.
        let balance = provider.get_balance(whale).await.unwrap();
        assert_eq!(balance, U256::from(10).pow(U256::from(18)));
    }
}
