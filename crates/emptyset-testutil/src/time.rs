//! Block and time manipulation on a simulated chain.
//!
//! Thin pass-throughs to the simulator's RPC surface; ordering guarantees
//! (a mined block observing an advanced timestamp, say) are the simulator's.

use crate::error::{
    TestUtilError,
    TestUtilResult,
};
use alloy_provider::{
    Provider,
    ext::AnvilApi,
};
use alloy_rpc_types::BlockId;
use alloy_rpc_types_anvil::Forking;
use emptyset_common::ForkConfig;

/// Timestamp of the latest block.
pub async fn current_timestamp<P: Provider>(provider: &P) -> TestUtilResult<u64> {
    let number = provider.get_block_number().await?;
    let block = provider
        .get_block(BlockId::number(number))
        .await?
        .ok_or(TestUtilError::BlockNotFound(number))?;
    Ok(block.header.timestamp)
}

/// Number of the latest block.
pub async fn current_block_number<P: Provider>(provider: &P) -> TestUtilResult<u64> {
    Ok(provider.get_block_number().await?)
}

/// Mine a single block.
pub async fn mine_block<P: Provider>(provider: &P) -> TestUtilResult {
    provider.evm_mine(None).await?;
    Ok(())
}

/// Mine `blocks` blocks in one request. A zero count is a no-op.
pub async fn mine_blocks<P: Provider>(provider: &P, blocks: u64) -> TestUtilResult {
    if blocks == 0 {
        return Ok(());
    }
    provider.anvil_mine(Some(blocks), None).await?;
    Ok(())
}

/// Mine forward until the chain head reaches `target`. Does nothing when the
/// head is already at or past the target; this never rewinds the chain.
pub async fn mine_to<P: Provider>(provider: &P, target: u64) -> TestUtilResult {
    let current = provider.get_block_number().await?;
    mine_blocks(provider, target.saturating_sub(current)).await
}

/// Advance simulated time by `seconds` and mine a block so the new
/// timestamp is observable on the chain head.
pub async fn increase_time<P: Provider>(provider: &P, seconds: u64) -> TestUtilResult {
    provider.anvil_increase_time(seconds).await?;
    mine_block(provider).await
}

/// Reset the simulated chain, re-forking the configured upstream when one is
/// given and starting from a fresh state otherwise.
pub async fn reset<P: Provider>(provider: &P, fork: Option<&ForkConfig>) -> TestUtilResult {
    let forking = fork.map(|fork| {
        Forking {
            json_rpc_url: fork.url.as_ref().map(|url| url.to_string()),
            block_number: fork.block_number,
        }
    });
    provider.anvil_reset(forking).await?;
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

    fn provider_for(node: &MockRpcNode) -> RootProvider {
        ProviderBuilder::new()
            .connect_http(node.url().parse().unwrap())
            .root()
            .clone()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reads_the_latest_timestamp() {
        let node = MockRpcNode::start().await.unwrap();
        let provider = provider_for(&node);

        assert_eq!(current_timestamp(&provider).await.unwrap(), 0);
        assert_eq!(current_block_number(&provider).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mining_advances_block_and_time() {
        let node = MockRpcNode::start().await.unwrap();
        let provider = provider_for(&node);

        mine_block(&provider).await.unwrap();
        assert_eq!(current_block_number(&provider).await.unwrap(), 1);

        mine_blocks(&provider, 5).await.unwrap();
        assert_eq!(current_block_number(&provider).await.unwrap(), 6);

        // A zero count must not even hit the node.
        mine_blocks(&provider, 0).await.unwrap();
        assert!(node.calls_of("anvil_mine").len() == 1);
        assert_eq!(current_block_number(&provider).await.unwrap(), 6);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mine_to_only_moves_forward() {
        let node = MockRpcNode::start().await.unwrap();
        let provider = provider_for(&node);

        mine_to(&provider, 4).await.unwrap();
        assert_eq!(current_block_number(&provider).await.unwrap(), 4);

        // Already past the target: no extra blocks are mined.
        mine_to(&provider, 2).await.unwrap();
        assert_eq!(current_block_number(&provider).await.unwrap(), 4);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn increase_time_is_observable_on_the_head() {
        let node = MockRpcNode::start().await.unwrap();
        let provider = provider_for(&node);

        let before = current_timestamp(&provider).await.unwrap();
        increase_time(&provider, 3600).await.unwrap();
        let after = current_timestamp(&provider).await.unwrap();

        assert!(after >= before + 3600);
        // The observing block was mined as part of the helper.
        assert_eq!(current_block_number(&provider).await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reset_passes_the_fork_settings_through() {
        let node = MockRpcNode::start().await.unwrap();
        let provider = provider_for(&node);

        mine_blocks(&provider, 3).await.unwrap();

        let fork = ForkConfig {
            enabled: true,
            url: Some("https://mainnet.example.com/rpc".parse().unwrap()),
            block_number: Some(17_000_000),
        };
        reset(&provider, Some(&fork)).await.unwrap();

        let calls = node.calls_of("anvil_reset");
        assert_eq!(calls.len(), 1);
        let rendered = calls[0].to_string();
        assert!(rendered.contains("mainnet.example.com"));
        assert!(rendered.contains("17000000"));
        assert_eq!(current_block_number(&provider).await.unwrap(), 17_000_000);

        // A bare reset rewinds to a fresh chain.
        reset(&provider, None).await.unwrap();
        assert_eq!(current_block_number(&provider).await.unwrap(), 0);
    }
}
