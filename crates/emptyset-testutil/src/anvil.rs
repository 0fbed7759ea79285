//! Spawning a local anvil and connecting providers to it.

use crate::error::TestUtilResult;
use alloy_node_bindings::{
    Anvil,
    AnvilInstance,
};
use alloy_provider::{
    Provider,
    ProviderBuilder,
    RootProvider,
    WsConnect,
    ext::AnvilApi,
};
use emptyset_common::ForkConfig;

/// Spawn a fresh anvil with auto-impersonation enabled.
///
/// The instance shuts the node down on drop, so callers must keep it alive
/// for the duration of the test.
pub async fn spawn() -> TestUtilResult<(AnvilInstance, RootProvider)> {
    let anvil = Anvil::new().try_spawn()?;
    let provider = connect_ws(&anvil.ws_endpoint()).await?;
    provider.anvil_auto_impersonate_account(true).await?;
    Ok((anvil, provider))
}

/// Spawn an anvil forking the configured upstream chain.
pub async fn spawn_forked(fork: &ForkConfig) -> TestUtilResult<(AnvilInstance, RootProvider)> {
    let mut anvil = Anvil::new();
    if let Some(url) = &fork.url {
        anvil = anvil.fork(url.to_string());
    }
    if let Some(block) = fork.block_number {
        anvil = anvil.fork_block_number(block);
    }
    let anvil = anvil.try_spawn()?;
    let provider = connect_ws(&anvil.ws_endpoint()).await?;
    provider.anvil_auto_impersonate_account(true).await?;
    Ok((anvil, provider))
}

/// Connect a websocket provider and strip it down to the root transport.
pub async fn connect_ws(url: &str) -> TestUtilResult<RootProvider> {
    let provider = ProviderBuilder::new()
        .connect_ws(WsConnect::new(url))
        .await?;
    Ok(provider.root().clone())
}
