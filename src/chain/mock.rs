//! In-memory [`ChainClient`] used by tests.
use super::{ChainClient, Receipt};
use crate::error::ChainError;
use alloy::{
    consensus::{Transaction, TxEnvelope},
    eips::eip2718::Decodable2718,
    primitives::{Address, Bytes, ChainId, TxHash, U256},
    rpc::types::TransactionRequest,
    transports::TransportErrorKind,
};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Mutex};

#[derive(Debug)]
struct MockState {
    chain_id: ChainId,
    connected: bool,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    nonce_lag: u64,
    code: HashMap<Address, Bytes>,
    gas_price: u128,
    gas_estimate: Option<u64>,
    gas_used: u64,
    receipt_success: bool,
    revert_reason: Option<String>,
    fail_balance_reads: bool,
    fail_broadcast: bool,
    fail_receipts: bool,
    block_number: u64,
    receipts: HashMap<TxHash, Receipt>,
    sent: Vec<TxEnvelope>,
    calls: usize,
}

/// A scriptable chain.
///
/// Successful transactions debit value plus gas from the sender, reverted ones only gas.
#[derive(Debug)]
pub(crate) struct MockChain {
    state: Mutex<MockState>,
}

impl MockChain {
    pub(crate) fn new(chain_id: ChainId) -> Self {
        Self {
            state: Mutex::new(MockState {
                chain_id,
                connected: true,
                balances: HashMap::new(),
                nonces: HashMap::new(),
                nonce_lag: 0,
                code: HashMap::new(),
                gas_price: 0,
                gas_estimate: Some(21_000),
                gas_used: 21_000,
                receipt_success: true,
                revert_reason: None,
                fail_balance_reads: false,
                fail_broadcast: false,
                fail_receipts: false,
                block_number: 100,
                receipts: HashMap::new(),
                sent: Vec::new(),
                calls: 0,
            }),
        }
    }

    pub(crate) fn with_balance(self, address: Address, balance: U256) -> Self {
        self.state.lock().unwrap().balances.insert(address, balance);
        self
    }

    pub(crate) fn with_nonce(self, address: Address, nonce: u64) -> Self {
        self.state.lock().unwrap().nonces.insert(address, nonce);
        self
    }

    pub(crate) fn with_gas_price(self, gas_price: u128) -> Self {
        self.state.lock().unwrap().gas_price = gas_price;
        self
    }

    /// Sets the gas estimate; `None` makes estimation fail.
    pub(crate) fn with_gas_estimate(self, estimate: Option<u64>) -> Self {
        self.state.lock().unwrap().gas_estimate = estimate;
        self
    }

    /// Makes every receipt report status `0` and simulations revert with `reason`.
    pub(crate) fn reverting(self, reason: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.receipt_success = false;
            state.revert_reason = Some(reason.to_string());
        }
        self
    }

    pub(crate) fn disconnected(self) -> Self {
        self.state.lock().unwrap().connected = false;
        self
    }

    pub(crate) fn set_code(&self, address: Address, code: Bytes) {
        self.state.lock().unwrap().code.insert(address, code);
    }

    pub(crate) fn set_balance(&self, address: Address, balance: U256) {
        self.state.lock().unwrap().balances.insert(address, balance);
    }

    pub(crate) fn set_fail_balance_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_balance_reads = fail;
    }

    pub(crate) fn set_fail_broadcast(&self, fail: bool) {
        self.state.lock().unwrap().fail_broadcast = fail;
    }

    /// Makes receipt waits fail as if they timed out.
    pub(crate) fn set_fail_receipts(&self, fail: bool) {
        self.state.lock().unwrap().fail_receipts = fail;
    }

    /// Makes transaction count reads trail the accepted nonce by `lag`.
    pub(crate) fn set_nonce_lag(&self, lag: u64) {
        self.state.lock().unwrap().nonce_lag = lag;
    }

    pub(crate) fn balance_of(&self, address: Address) -> U256 {
        self.state.lock().unwrap().balances.get(&address).copied().unwrap_or_default()
    }

    /// Transactions accepted so far, in broadcast order.
    pub(crate) fn sent(&self) -> Vec<TxEnvelope> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Number of `eth_call` simulations performed.
    pub(crate) fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }

    async fn balance(&self, address: Address) -> Result<U256, ChainError> {
        let state = self.state.lock().unwrap();
        if state.fail_balance_reads {
            return Err(TransportErrorKind::custom_str("connection refused").into());
        }
        Ok(state.balances.get(&address).copied().unwrap_or_default())
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, ChainError> {
        let state = self.state.lock().unwrap();
        let nonce = state.nonces.get(&address).copied().unwrap_or_default();
        Ok(nonce.saturating_sub(state.nonce_lag))
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        Ok(self.state.lock().unwrap().gas_price)
    }

    async fn estimate_gas(&self, _tx: &TransactionRequest) -> Result<u64, ChainError> {
        self.state
            .lock()
            .unwrap()
            .gas_estimate
            .ok_or_else(|| TransportErrorKind::custom_str("execution reverted").into())
    }

    async fn call(&self, _tx: &TransactionRequest) -> Result<Bytes, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        match &state.revert_reason {
            Some(reason) => Err(TransportErrorKind::custom_str(reason).into()),
            None => Ok(Bytes::new()),
        }
    }

    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, ChainError> {
        let envelope = TxEnvelope::decode_2718(&mut &encoded[..])
            .map_err(|err| TransportErrorKind::custom_str(&err.to_string()))?;
        let from = envelope
            .recover_signer()
            .map_err(|err| TransportErrorKind::custom_str(&err.to_string()))?;

        let mut state = self.state.lock().unwrap();
        if state.fail_broadcast {
            return Err(TransportErrorKind::custom_str("broadcast rejected").into());
        }
        if envelope.chain_id() != Some(state.chain_id) {
            return Err(TransportErrorKind::custom_str("invalid chain id").into());
        }

        let expected_nonce = state.nonces.get(&from).copied().unwrap_or_default();
        if envelope.nonce() != expected_nonce {
            return Err(TransportErrorKind::custom_str("nonce too low").into());
        }

        let gas_cost =
            U256::from(state.gas_used) * U256::from(envelope.gas_price().unwrap_or_default());
        let debit =
            if state.receipt_success { envelope.value() + gas_cost } else { gas_cost };
        let balance = state.balances.entry(from).or_default();
        *balance = balance.saturating_sub(debit);
        state.nonces.insert(from, expected_nonce + 1);

        state.block_number += 1;
        let tx_hash = *envelope.tx_hash();
        let receipt =
            Receipt { tx_hash, block_number: state.block_number, success: state.receipt_success };
        state.receipts.insert(tx_hash, receipt);
        state.sent.push(envelope);

        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Receipt, ChainError> {
        let state = self.state.lock().unwrap();
        if state.fail_receipts {
            return Err(TransportErrorKind::custom_str("timed out waiting for receipt").into());
        }
        state
            .receipts
            .get(&tx_hash)
            .copied()
            .ok_or_else(|| TransportErrorKind::custom_str("receipt not found").into())
    }

    async fn chain_id(&self) -> Result<ChainId, ChainError> {
        let state = self.state.lock().unwrap();
        if !state.connected {
            return Err(TransportErrorKind::custom_str("connection refused").into());
        }
        Ok(state.chain_id)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        Ok(self.state.lock().unwrap().code.get(&address).cloned().unwrap_or_default())
    }
}
