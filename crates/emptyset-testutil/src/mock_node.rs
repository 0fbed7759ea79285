//! A canned-response JSON-RPC node for tests.
//!
//! Serves the subset of the `eth_`/`evm_`/`anvil_` surface the deployment
//! engine and the chain helpers touch, keeps a little simulated head state
//! (block number, timestamp, balances) so mining and time travel are
//! observable, and records every request so tests can assert exactly which
//! RPCs were issued and with which parameters.

use crate::error::{
    TestUtilError,
    TestUtilResult,
};
use alloy_primitives::{
    Address,
    U256,
    address,
};
use axum::{
    Json,
    Router,
    extract::State,
    routing::post,
};
use parking_lot::Mutex;
use serde_json::{
    Value,
    json,
};
use std::collections::{
    HashMap,
    VecDeque,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{
    AtomicU64,
    Ordering,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Simulated seconds between blocks.
const SECONDS_PER_BLOCK: u64 = 12;

/// The first two well-known anvil dev accounts.
const DEFAULT_ACCOUNTS: [Address; 2] = [
    address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
    address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"),
];

/// One recorded JSON-RPC request.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

/// Mock JSON-RPC node. Shuts down when dropped.
#[derive(Debug)]
pub struct MockRpcNode {
    addr: SocketAddr,
    state: Arc<NodeState>,
    shutdown: CancellationToken,
}

#[derive(Debug)]
struct NodeState {
    chain_id: u64,
    accounts: Vec<Address>,
    block_number: AtomicU64,
    timestamp: AtomicU64,
    tx_counter: AtomicU64,
    responses: Mutex<HashMap<String, Value>>,
    scripted: Mutex<HashMap<String, VecDeque<Value>>>,
    errors: Mutex<HashMap<String, (i64, String)>>,
    balances: Mutex<HashMap<Address, U256>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRpcNode {
    /// Start a node with the local simulator chain id.
    pub async fn start() -> TestUtilResult<Self> {
        Self::start_with_chain_id(31337).await
    }

    pub async fn start_with_chain_id(chain_id: u64) -> TestUtilResult<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(TestUtilError::Bind)?;
        let addr = listener.local_addr().map_err(TestUtilError::Bind)?;

        let state = Arc::new(NodeState {
            chain_id,
            accounts: DEFAULT_ACCOUNTS.to_vec(),
            block_number: AtomicU64::new(0),
            timestamp: AtomicU64::new(0),
            tx_counter: AtomicU64::new(0),
            responses: Mutex::new(HashMap::new()),
            scripted: Mutex::new(HashMap::new()),
            errors: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/", post(handle_request))
            .with_state(Arc::clone(&state));

        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        tokio::spawn(async move {
            let server =
                axum::serve(listener, app).with_graceful_shutdown(token.cancelled_owned());
            if let Err(err) = server.await {
                eprintln!("mock rpc node error: {err}");
            }
        });

        debug!(addr = %addr, chain_id, "mock rpc node listening");
        Ok(Self {
            addr,
            state,
            shutdown,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Unlocked accounts served from `eth_accounts`.
    pub fn accounts(&self) -> &[Address] {
        &self.state.accounts
    }

    pub fn account(&self, index: usize) -> Address {
        self.state.accounts[index]
    }

    pub fn block_number(&self) -> u64 {
        self.state.block_number.load(Ordering::Acquire)
    }

    /// Replace the canned response for `method`.
    pub fn set_response(&self, method: &str, result: Value) {
        self.state
            .responses
            .lock()
            .insert(method.to_string(), result);
    }

    /// Queue a one-shot response for `method`. Scripted responses are
    /// consumed in order before canned responses and built-in defaults.
    pub fn script(&self, method: &str, result: Value) {
        self.state
            .scripted
            .lock()
            .entry(method.to_string())
            .or_default()
            .push_back(result);
    }

    /// Make `method` fail with a JSON-RPC error.
    pub fn set_error(&self, method: &str, code: i64, message: &str) {
        self.state
            .errors
            .lock()
            .insert(method.to_string(), (code, message.to_string()));
    }

    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state.balances.lock().insert(address, balance);
    }

    /// Every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().clone()
    }

    /// Parameters of every `method` request received so far.
    pub fn calls_of(&self, method: &str) -> Vec<Value> {
        self.state
            .calls
            .lock()
            .iter()
            .filter(|call| call.method == method)
            .map(|call| call.params.clone())
            .collect()
    }

    /// Transaction objects submitted through `eth_sendTransaction`.
    pub fn sent_transactions(&self) -> Vec<Value> {
        self.calls_of("eth_sendTransaction")
            .into_iter()
            .filter_map(|params| params.get(0).cloned())
            .collect()
    }
}

impl Drop for MockRpcNode {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_request(
    State(state): State<Arc<NodeState>>,
    Json(request): Json<Value>,
) -> Json<Value> {
    Json(state.respond(&request))
}

impl NodeState {
    fn respond(&self, request: &Value) -> Value {
        let method = request
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let params = request.get("params").cloned().unwrap_or(Value::Null);
        let id = request.get("id").cloned().unwrap_or(json!(1));

        self.calls.lock().push(RecordedCall {
            method: method.clone(),
            params: params.clone(),
        });

        if let Some((code, message)) = self.errors.lock().get(&method) {
            return json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": code, "message": message }
            });
        }

        let result = self
            .pop_scripted(&method)
            .or_else(|| self.responses.lock().get(&method).cloned())
            .unwrap_or_else(|| self.builtin_response(&method, &params));

        json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result
        })
    }

    fn pop_scripted(&self, method: &str) -> Option<Value> {
        self.scripted.lock().get_mut(method)?.pop_front()
    }

    fn builtin_response(&self, method: &str, params: &Value) -> Value {
        match method {
            "eth_chainId" => json!(format!("0x{:x}", self.chain_id)),
            "eth_accounts" => {
                json!(
                    self.accounts
                        .iter()
                        .map(|account| format!("{account}"))
                        .collect::<Vec<_>>()
                )
            }
            "eth_blockNumber" => {
                json!(format!("0x{:x}", self.block_number.load(Ordering::Acquire)))
            }
            "eth_getBlockByNumber" | "eth_getBlockByHash" => self.block_json(),
            "eth_getBalance" => {
                let balance = params
                    .get(0)
                    .and_then(Value::as_str)
                    .and_then(|raw| raw.parse::<Address>().ok())
                    .and_then(|address| self.balances.lock().get(&address).copied())
                    .unwrap_or(U256::ZERO);
                json!(format!("0x{balance:x}"))
            }
            "eth_getTransactionCount" => json!("0x0"),
            "eth_getCode" | "eth_call" => json!("0x"),
            "eth_sendTransaction" => {
                let counter = self.tx_counter.fetch_add(1, Ordering::AcqRel) + 1;
                json!(format!("0x{counter:064x}"))
            }
            "eth_getTransactionReceipt" => self.default_receipt(params),
            "evm_mine" => {
                self.advance_blocks(1);
                json!("0x0")
            }
            "anvil_mine" => {
                let blocks = params.get(0).and_then(Value::as_u64).unwrap_or(1);
                self.advance_blocks(blocks);
                Value::Null
            }
            "evm_increaseTime" => {
                let seconds = params.get(0).and_then(Value::as_u64).unwrap_or(0);
                self.timestamp.fetch_add(seconds, Ordering::AcqRel);
                json!(seconds)
            }
            "anvil_reset" => {
                let forked_block = params
                    .get(0)
                    .and_then(|options| options.get("forking"))
                    .and_then(|forking| forking.get("blockNumber"))
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                self.block_number.store(forked_block, Ordering::Release);
                self.timestamp
                    .store(forked_block * SECONDS_PER_BLOCK, Ordering::Release);
                Value::Null
            }
            "anvil_setBalance" => {
                let address = params
                    .get(0)
                    .and_then(Value::as_str)
                    .and_then(|raw| raw.parse::<Address>().ok());
                let balance = params
                    .get(1)
                    .and_then(Value::as_str)
                    .and_then(|raw| U256::from_str_radix(raw.trim_start_matches("0x"), 16).ok());
                if let (Some(address), Some(balance)) = (address, balance) {
                    self.balances.lock().insert(address, balance);
                }
                Value::Null
            }
            "anvil_impersonateAccount"
            | "anvil_stopImpersonatingAccount"
            | "anvil_autoImpersonateAccount"
            | "evm_setAutomine" => Value::Null,
            // Unknown methods get a null result rather than an error.
            _ => Value::Null,
        }
    }

    fn advance_blocks(&self, blocks: u64) {
        self.block_number.fetch_add(blocks, Ordering::AcqRel);
        self.timestamp
            .fetch_add(blocks * SECONDS_PER_BLOCK, Ordering::AcqRel);
    }

    fn block_json(&self) -> Value {
        let number = self.block_number.load(Ordering::Acquire);
        let timestamp = self.timestamp.load(Ordering::Acquire);
        json!({
            "hash": format!("0x{number:064x}"),
            "parentHash": format!("0x{:064x}", number.saturating_sub(1)),
            "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
            "miner": "0x0000000000000000000000000000000000000000",
            "stateRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
            "transactionsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
            "receiptsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
            "logsBloom": format!("0x{:0512}", 0),
            "difficulty": "0x0",
            "number": format!("0x{number:x}"),
            "gasLimit": "0x1c9c380",
            "gasUsed": "0x0",
            "timestamp": format!("0x{timestamp:x}"),
            "extraData": "0x",
            "mixHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "nonce": "0x0000000000000000",
            "totalDifficulty": "0x0",
            "baseFeePerGas": "0x7",
            "size": "0x21c",
            "transactions": [],
            "uncles": []
        })
    }

    // A successful receipt for the latest submitted transaction. Tests that
    // need logs, reverts or specific addresses script the receipt instead.
    fn default_receipt(&self, params: &Value) -> Value {
        let number = self.block_number.load(Ordering::Acquire);
        let counter = self.tx_counter.load(Ordering::Acquire);
        let tx_hash = params
            .get(0)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("0x{counter:064x}"));
        json!({
            "transactionHash": tx_hash,
            "transactionIndex": "0x0",
            "blockHash": format!("0x{number:064x}"),
            "blockNumber": format!("0x{number:x}"),
            "from": format!("{}", self.accounts[0]),
            "to": null,
            "cumulativeGasUsed": "0x5208",
            "gasUsed": "0x5208",
            "contractAddress": format!("0x{:040x}", 0x00c0_ffee_u64 + counter),
            "logs": [],
            "logsBloom": format!("0x{:0512}", 0),
            "status": "0x1",
            "effectiveGasPrice": "0x7",
            "type": "0x2"
        })
    }
}
