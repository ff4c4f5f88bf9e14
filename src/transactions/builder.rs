use crate::{
    chain::{ChainClient, ChainEndpoint},
    error::BridgeError,
};
use alloy::{
    consensus::TxLegacy,
    primitives::{Address, Bytes, ChainId, TxKind, U256},
    rpc::types::TransactionRequest,
};
use tracing::{info, warn};

/// Numerator of the gas estimate buffer (20%).
const GAS_BUFFER_NUMERATOR: u64 = 6;
/// Denominator of the gas estimate buffer.
const GAS_BUFFER_DENOMINATOR: u64 = 5;

/// Applies the 20% buffer to a gas estimate, rounding up.
pub fn gas_limit_with_buffer(estimate: u64) -> u64 {
    let buffered = u128::from(estimate) * u128::from(GAS_BUFFER_NUMERATOR);
    u64::try_from(buffered.div_ceil(u128::from(GAS_BUFFER_DENOMINATOR))).unwrap_or(u64::MAX)
}

/// An unsigned bridge transaction.
///
/// Built fresh for every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    /// The bridge contract.
    pub to: Address,
    /// The bridged amount in wei.
    pub value: U256,
    /// Bridge calldata.
    pub input: Bytes,
    /// Gas price in wei.
    pub gas_price: u128,
    /// Gas limit.
    pub gas_limit: u64,
    /// Sender nonce.
    pub nonce: u64,
    /// Chain id.
    pub chain_id: ChainId,
}

impl TransactionDraft {
    /// The draft as an RPC request sent from `from`.
    pub fn request(&self, from: Address) -> TransactionRequest {
        TransactionRequest {
            gas_price: Some(self.gas_price),
            ..TransactionRequest::default()
                .from(from)
                .to(self.to)
                .value(self.value)
                .input(self.input.clone().into())
                .gas_limit(self.gas_limit)
                .nonce(self.nonce)
        }
    }

    /// Converts the draft into a signable EIP-155 legacy transaction.
    pub fn into_legacy(self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: self.value,
            input: self.input,
        }
    }
}

/// Assembles [`TransactionDraft`]s for bridge calls.
#[derive(Debug, Clone, Copy)]
pub struct TransactionBuilder {
    fallback_gas_limit: u64,
}

impl TransactionBuilder {
    /// Creates a new [`TransactionBuilder`] that falls back to `fallback_gas_limit` when
    /// estimation fails.
    pub const fn new(fallback_gas_limit: u64) -> Self {
        Self { fallback_gas_limit }
    }

    /// Builds a draft sending `amount` from `from` to the bridge at `endpoint`.
    ///
    /// Nonce and gas price are read from the chain on every call. A failed gas estimation is not
    /// an error: the fallback gas limit is used instead.
    pub async fn build<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        from: Address,
        endpoint: &ChainEndpoint,
        amount: U256,
    ) -> Result<TransactionDraft, BridgeError> {
        let nonce = client.transaction_count(from).await.map_err(BridgeError::Build)?;
        let gas_price = client.gas_price().await.map_err(BridgeError::Build)?;

        let mut draft = TransactionDraft {
            to: endpoint.bridge_contract,
            value: amount,
            input: endpoint.calldata.clone(),
            gas_price,
            gas_limit: self.fallback_gas_limit,
            nonce,
            chain_id: endpoint.chain_id,
        };

        // estimate without capping at the fallback limit
        let request = TransactionRequest { gas: None, ..draft.request(from) };

        match client.estimate_gas(&request).await {
            Ok(estimate) => {
                draft.gas_limit = gas_limit_with_buffer(estimate);
                info!(estimate, gas_limit = draft.gas_limit, "Estimated gas");
            }
            Err(err) => {
                warn!(
                    %err,
                    gas_limit = self.fallback_gas_limit,
                    "Gas estimation failed, using fallback gas limit"
                );
            }
        }

        Ok(draft)
    }
}
