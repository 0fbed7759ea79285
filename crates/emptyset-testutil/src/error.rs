use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestUtilError {
    /// The underlying RPC call failed.
    #[error("rpc call failed")]
    Transport(#[from] alloy_transport::TransportError),

    /// Launching the anvil binary failed.
    #[error("failed to launch anvil")]
    Node(#[from] alloy_node_bindings::NodeError),

    /// A block we just referenced does not exist on the node.
    #[error("block {0} not found")]
    BlockNotFound(u64),

    /// The mock node could not bind its listener.
    #[error("failed to bind mock rpc node")]
    Bind(#[source] std::io::Error),
}

/// Result type alias for test utilities.
pub type TestUtilResult<T = ()> = std::result::Result<T, TestUtilError>;
