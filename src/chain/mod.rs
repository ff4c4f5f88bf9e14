//! Chain connectivity: the [`ChainClient`] boundary and the bridge routes between the two chains.
use crate::{
    config::ChainConfig,
    error::{BridgeError, ChainError},
};
use alloy::{
    primitives::{Address, Bytes, ChainId, TxHash, U256},
    providers::ProviderBuilder,
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use std::{fmt, time::Duration};
use tracing::{info, warn};
use url::Url;

mod rpc;
pub use rpc::RpcChain;

#[cfg(test)]
pub(crate) mod mock;

/// One of the two chains the bridger moves funds between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Arbitrum.
    Arbitrum,
    /// Base.
    Base,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arbitrum => f.write_str("Arbitrum"),
            Self::Base => f.write_str("Base"),
        }
    }
}

/// Direction of a bridge transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Bridge from Arbitrum to Base.
    ArbToBase,
    /// Bridge from Base to Arbitrum.
    BaseToArb,
}

impl Direction {
    /// The chain funds leave from.
    pub const fn source(self) -> Side {
        match self {
            Self::ArbToBase => Side::Arbitrum,
            Self::BaseToArb => Side::Base,
        }
    }

    /// The chain funds arrive on.
    pub const fn destination(self) -> Side {
        match self {
            Self::ArbToBase => Side::Base,
            Self::BaseToArb => Side::Arbitrum,
        }
    }

    /// The direction drained after this one within a cycle, if any.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::ArbToBase => Some(Self::BaseToArb),
            Self::BaseToArb => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArbToBase => f.write_str("ARB -> BASE"),
            Self::BaseToArb => f.write_str("BASE -> ARB"),
        }
    }
}

/// Network identity of a bridge route on its source chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEndpoint {
    /// Chain id of the source chain.
    pub chain_id: ChainId,
    /// The bridge contract called on the source chain.
    pub bridge_contract: Address,
    /// Pre-encoded calldata for the bridge call.
    pub calldata: Bytes,
}

impl ChainEndpoint {
    /// Resolves the endpoint for `config` against a connected client.
    ///
    /// Fails if the client reports a chain id different from the configured one.
    pub async fn resolve<C: ChainClient + ?Sized>(
        client: &C,
        config: &ChainConfig,
    ) -> Result<Self, BridgeError> {
        let actual = client.chain_id().await.map_err(|source| BridgeError::ChainIdLookup {
            url: config.rpc_url.to_string(),
            source,
        })?;

        if let Some(expected) = config.chain_id.filter(|expected| *expected != actual) {
            return Err(BridgeError::ChainIdMismatch {
                url: config.rpc_url.to_string(),
                expected,
                actual,
            });
        }

        Ok(Self {
            chain_id: actual,
            bridge_contract: config.bridge_contract,
            calldata: config.calldata.clone(),
        })
    }
}

/// The two bridge routes, one per [`Direction`].
#[derive(Debug, Clone)]
pub struct Routes {
    /// Route on Arbitrum towards Base.
    pub arb_to_base: ChainEndpoint,
    /// Route on Base towards Arbitrum.
    pub base_to_arb: ChainEndpoint,
}

impl Routes {
    /// Returns the endpoint for `direction`.
    pub const fn endpoint(&self, direction: Direction) -> &ChainEndpoint {
        match direction {
            Direction::ArbToBase => &self.arb_to_base,
            Direction::BaseToArb => &self.base_to_arb,
        }
    }
}

/// A confirmed transaction outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Hash of the transaction.
    pub tx_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Whether the receipt status was `1`.
    pub success: bool,
}

/// A JSON-RPC connection to one chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Returns true if the endpoint answers requests.
    async fn is_connected(&self) -> bool;

    /// Native balance of `address` in wei.
    async fn balance(&self, address: Address) -> Result<U256, ChainError>;

    /// Transaction count (next nonce) of `address`.
    async fn transaction_count(&self, address: Address) -> Result<u64, ChainError>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> Result<u128, ChainError>;

    /// Estimates the gas `tx` would consume.
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, ChainError>;

    /// Simulates `tx` against the latest block.
    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, ChainError>;

    /// Broadcasts an EIP-2718 encoded signed transaction.
    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, ChainError>;

    /// Waits until the receipt of `tx_hash` is available.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Receipt, ChainError>;

    /// Chain id of the connected chain.
    async fn chain_id(&self) -> Result<ChainId, ChainError>;

    /// Deployed code at `address`.
    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError>;
}

/// Connects to the HTTP JSON-RPC endpoint at `url`.
///
/// `receipt_timeout` bounds receipt waits; `None` waits forever.
pub async fn connect(
    url: Url,
    receipt_timeout: Option<Duration>,
) -> Result<impl ChainClient, BridgeError> {
    let provider = ProviderBuilder::new().on_http(url.clone());
    let chain = RpcChain::new(provider, receipt_timeout);
    ensure_connected(&chain, &url).await?;
    Ok(chain)
}

/// Fails with [`BridgeError::Connectivity`] if `client` does not answer.
pub async fn ensure_connected<C: ChainClient + ?Sized>(
    client: &C,
    url: &Url,
) -> Result<(), BridgeError> {
    if !client.is_connected().await {
        return Err(BridgeError::Connectivity { url: url.to_string() });
    }
    Ok(())
}

/// Checks that a contract is deployed at `address`, logging the result.
///
/// Returns `false` when there is no code at the address.
pub async fn verify_contract_code<C: ChainClient + ?Sized>(
    client: &C,
    address: Address,
    network: &str,
) -> Result<bool, ChainError> {
    let code = client.code_at(address).await?;
    if code.is_empty() {
        warn!(%address, network, "No contract found");
        return Ok(false);
    }

    info!(%address, network, code_len = code.len(), "Contract exists");
    Ok(true)
}
