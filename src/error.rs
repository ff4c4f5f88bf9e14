//! Bridger error types.
use alloy::{
    primitives::ChainId,
    providers::PendingTransactionError,
    transports::{RpcError, TransportErrorKind},
};

/// Errors returned by a [`ChainClient`](crate::chain::ChainClient).
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// RPC error.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
    /// Error while waiting for a pending transaction.
    #[error(transparent)]
    Pending(#[from] PendingTransactionError),
    /// The receipt was returned without a block number.
    #[error("receipt for {0} has no block number")]
    MissingBlockNumber(alloy::primitives::TxHash),
}

/// Coarse classification of a [`BridgeError`].
///
/// The orchestrator maps each kind to a recovery delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Endpoint unreachable or misconfigured.
    Connectivity,
    /// Balance read failed.
    Balance,
    /// Nonce, gas price or chain id lookup failed while building.
    Build,
    /// Local signing failed.
    Sign,
    /// Broadcast or receipt wait failed.
    Submission,
}

/// Errors raised while bridging.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The RPC endpoint could not be reached.
    #[error("failed to connect to {url}")]
    Connectivity {
        /// The endpoint that was dialed.
        url: String,
    },
    /// The chain id of the endpoint could not be read.
    #[error("failed to read chain id from {url}")]
    ChainIdLookup {
        /// The endpoint that was dialed.
        url: String,
        /// The underlying RPC error.
        #[source]
        source: ChainError,
    },
    /// The endpoint serves a different chain than configured.
    #[error("chain id mismatch for {url}: expected {expected}, got {actual}")]
    ChainIdMismatch {
        /// The endpoint that was dialed.
        url: String,
        /// Configured chain id.
        expected: ChainId,
        /// Chain id reported by the endpoint.
        actual: ChainId,
    },
    /// Reading a balance failed.
    #[error("failed to read balance: {0}")]
    Balance(#[source] ChainError),
    /// Building a transaction failed.
    #[error("failed to build transaction: {0}")]
    Build(#[source] ChainError),
    /// Signing a transaction failed.
    #[error(transparent)]
    Sign(#[from] alloy::signers::Error),
    /// Broadcasting or confirming a transaction failed.
    #[error("failed to submit transaction: {0}")]
    Submission(#[source] ChainError),
}

impl BridgeError {
    /// Returns the [`ErrorKind`] of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Connectivity { .. }
            | Self::ChainIdLookup { .. }
            | Self::ChainIdMismatch { .. } => ErrorKind::Connectivity,
            Self::Balance(_) => ErrorKind::Balance,
            Self::Build(_) => ErrorKind::Build,
            Self::Sign(_) => ErrorKind::Sign,
            Self::Submission(_) => ErrorKind::Submission,
        }
    }
}
