use super::TransactionDraft;
use crate::{
    chain::{ChainClient, Receipt},
    error::BridgeError,
    wallet::Wallet,
};
use alloy::{
    consensus::{SignableTransaction, TxEnvelope},
    eips::eip2718::Encodable2718,
    network::TxSignerSync,
    primitives::Address,
    rpc::types::TransactionRequest,
};
use std::fmt;
use tracing::info;

/// Terminal classification of a confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Receipt status `1`.
    Success,
    /// Any other receipt status.
    Fail,
}

impl From<&Receipt> for Outcome {
    fn from(receipt: &Receipt) -> Self {
        if receipt.success {
            Self::Success
        } else {
            Self::Fail
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("SUCCESS"),
            Self::Fail => f.write_str("FAIL"),
        }
    }
}

/// A broadcast and confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    /// The confirmed receipt.
    pub receipt: Receipt,
    /// Classification of the receipt.
    pub outcome: Outcome,
}

/// Signs, broadcasts and confirms [`TransactionDraft`]s.
///
/// Every call to [`TransactionSubmitter::submit`] broadcasts exactly one transaction.
#[derive(Debug, Clone)]
pub struct TransactionSubmitter {
    wallet: Wallet,
}

impl TransactionSubmitter {
    /// Creates a new [`TransactionSubmitter`] signing with `wallet`.
    pub const fn new(wallet: Wallet) -> Self {
        Self { wallet }
    }

    /// Address of the signing wallet.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Signs and broadcasts `draft`, then waits for its receipt.
    ///
    /// A reverted transaction is not an error, it is returned with [`Outcome::Fail`].
    pub async fn submit<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        draft: TransactionDraft,
    ) -> Result<Submission, BridgeError> {
        let mut tx = draft.into_legacy();
        let signature = self.wallet.signer().sign_transaction_sync(&mut tx)?;
        let encoded = TxEnvelope::from(tx.into_signed(signature)).encoded_2718();

        let tx_hash =
            client.send_raw_transaction(&encoded).await.map_err(BridgeError::Submission)?;
        info!(%tx_hash, "TX sent");

        let receipt = client.wait_for_receipt(tx_hash).await.map_err(BridgeError::Submission)?;
        let outcome = Outcome::from(&receipt);
        info!(%tx_hash, block = receipt.block_number, "{outcome}");

        Ok(Submission { receipt, outcome })
    }
}

/// Simulates `draft` from `from` against the latest block and returns a human readable reason for
/// why it fails.
pub async fn explain_failure<C: ChainClient + ?Sized>(
    client: &C,
    draft: &TransactionDraft,
    from: Address,
) -> String {
    let request = TransactionRequest::default()
        .from(from)
        .to(draft.to)
        .value(draft.value)
        .input(draft.input.clone().into());

    match client.call(&request).await {
        Ok(_) => "no revert reason (simulation succeeded)".to_string(),
        Err(err) => err.to_string(),
    }
}
