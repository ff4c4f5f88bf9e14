//! Native balance reads.
use crate::{
    chain::{ChainClient, Side},
    error::BridgeError,
};
use alloy::primitives::{utils::format_ether, Address, U256};
use std::{fmt, time::Instant};

/// A freshly queried native balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    /// The chain the balance was read on.
    pub chain: Side,
    /// The balance in wei.
    pub wei: U256,
    /// When the balance was read.
    pub taken_at: Instant,
}

impl BalanceSnapshot {
    /// The balance in whole ether.
    pub fn ether(&self) -> f64 {
        format_ether(self.wei).parse().unwrap_or_default()
    }

    /// Returns true if the balance is at or above `threshold` wei.
    pub fn is_drainable(&self, threshold: U256) -> bool {
        self.wei >= threshold
    }
}

impl fmt::Display for BalanceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH: {:.4}", self.chain, self.ether())
    }
}

/// Reads the wallet's native balance on either chain.
#[derive(Debug, Clone, Copy)]
pub struct BalanceMonitor {
    address: Address,
}

impl BalanceMonitor {
    /// Creates a new [`BalanceMonitor`] for `address`.
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// Reads the current balance through `client`.
    pub async fn read<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        side: Side,
    ) -> Result<BalanceSnapshot, BridgeError> {
        let wei = client.balance(self.address).await.map_err(BridgeError::Balance)?;
        Ok(BalanceSnapshot { chain: side, wei, taken_at: Instant::now() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chain::mock::MockChain, error::ErrorKind};
    use alloy::primitives::utils::parse_ether;

    #[tokio::test]
    async fn reads_fresh_balance() {
        let address = Address::repeat_byte(1);
        let chain = MockChain::new(1).with_balance(address, parse_ether("0.05").unwrap());
        let monitor = BalanceMonitor::new(address);

        let before = Instant::now();
        let snapshot = monitor.read(&chain, Side::Arbitrum).await.unwrap();
        assert_eq!(snapshot.chain, Side::Arbitrum);
        assert!(snapshot.taken_at >= before);
        assert_eq!(snapshot.wei, parse_ether("0.05").unwrap());
        assert_eq!(snapshot.ether(), 0.05);
        assert_eq!(snapshot.to_string(), "Arbitrum ETH: 0.0500");

        chain.set_balance(address, parse_ether("0.0123").unwrap());
        let fresh = monitor.read(&chain, Side::Arbitrum).await.unwrap();
        assert_eq!(fresh.ether(), 0.0123);
        assert!(fresh.taken_at >= snapshot.taken_at);
    }

    #[tokio::test]
    async fn propagates_rpc_failure() {
        let chain = MockChain::new(1);
        chain.set_fail_balance_reads(true);

        let err = BalanceMonitor::new(Address::ZERO).read(&chain, Side::Base).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Balance);
    }

    #[test]
    fn threshold_is_inclusive() {
        let threshold = parse_ether("0.01").unwrap();
        let taken_at = Instant::now();
        let at = BalanceSnapshot { chain: Side::Base, wei: threshold, taken_at };
        let below = BalanceSnapshot { wei: threshold - U256::from(1), ..at };

        assert!(at.is_drainable(threshold));
        assert!(!below.is_drainable(threshold));
    }
}
