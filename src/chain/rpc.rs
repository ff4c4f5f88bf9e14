use super::{ChainClient, Receipt};
use crate::error::ChainError;
use alloy::{
    network::Ethereum,
    primitives::{Address, Bytes, ChainId, TxHash, U256},
    providers::{PendingTransactionBuilder, Provider},
    rpc::types::TransactionRequest,
    transports::Transport,
};
use async_trait::async_trait;
use std::{marker::PhantomData, time::Duration};

/// A [`ChainClient`] backed by an alloy [`Provider`].
#[derive(Debug, Clone)]
pub struct RpcChain<P, T> {
    provider: P,
    receipt_timeout: Option<Duration>,
    _phantom: PhantomData<T>,
}

impl<P, T> RpcChain<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    /// Creates a new [`RpcChain`].
    pub fn new(provider: P, receipt_timeout: Option<Duration>) -> Self {
        Self { provider, receipt_timeout, _phantom: PhantomData }
    }
}

#[async_trait]
impl<P, T> ChainClient for RpcChain<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    async fn is_connected(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }

    async fn balance(&self, address: Address) -> Result<U256, ChainError> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, ChainError> {
        Ok(self.provider.get_transaction_count(address).await?)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, ChainError> {
        Ok(self.provider.estimate_gas(tx).await?)
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, ChainError> {
        Ok(self.provider.call(tx).await?)
    }

    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, ChainError> {
        let pending = self.provider.send_raw_transaction(encoded).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Receipt, ChainError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_timeout(self.receipt_timeout)
            .get_receipt()
            .await?;

        Ok(Receipt {
            tx_hash,
            block_number: receipt.block_number.ok_or(ChainError::MissingBlockNumber(tx_hash))?,
            success: receipt.status(),
        })
    }

    async fn chain_id(&self) -> Result<ChainId, ChainError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        Ok(self.provider.get_code_at(address).await?)
    }
}
