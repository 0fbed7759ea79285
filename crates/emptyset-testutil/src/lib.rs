#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]

//! Test-only helpers for driving a simulated chain: anvil spawning, block
//! mining and time travel, account impersonation, and a recording JSON-RPC
//! mock node for tests that must not depend on an anvil binary.

pub mod anvil;
pub mod error;
pub mod impersonate;
pub mod mock_node;
pub mod time;

pub use anvil::{
    connect_ws,
    spawn,
    spawn_forked,
};
pub use error::{
    TestUtilError,
    TestUtilResult,
};
pub use mock_node::{
    MockRpcNode,
    RecordedCall,
};
