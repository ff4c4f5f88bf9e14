//! The balance driven bridging loop.
//!
//! Every cycle starts in [`State::Idle`] by reading both balances. If neither chain holds the
//! minimum balance the loop cools down. Otherwise Arbitrum is drained towards Base and then Base
//! towards Arbitrum, one fixed amount transaction at a time, before the loop waits and starts
//! over. Any error aborts the cycle into [`State::ErrorBackoff`].
use crate::{
    balance::BalanceMonitor,
    chain::{ChainClient, Direction, Routes, Side},
    config::{BridgeConfig, TimingConfig},
    error::{BridgeError, ErrorKind},
    transactions::{explain_failure, Outcome, TransactionBuilder, TransactionSubmitter},
    wallet::Wallet,
};
use alloy::primitives::{utils::format_ether, U256};
use rand::Rng;
use std::time::Duration;
use tracing::{error, info, warn};

/// State of the bridging loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Start of a cycle: both balances are read.
    Idle,
    /// Bridging in the given direction while its source chain holds the minimum balance.
    Drain(Direction),
    /// Waiting before the next cycle.
    ColdWait(Duration),
    /// Waiting after a failed cycle.
    ErrorBackoff(Duration),
}

/// The outcome of advancing the loop by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State to continue from.
    pub next: State,
    /// Pause before continuing.
    pub pause: Duration,
}

impl Transition {
    /// Transition to `next` without pausing.
    pub const fn now(next: State) -> Self {
        Self { next, pause: Duration::ZERO }
    }

    /// Transition to `next` after `pause`.
    pub const fn after(next: State, pause: Duration) -> Self {
        Self { next, pause }
    }
}

/// Bridge attempts made in one direction since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionStats {
    /// Transactions confirmed with status `1`.
    pub successes: u64,
    /// Transactions confirmed with any other status.
    pub failures: u64,
    /// Last nonce submitted in this direction.
    pub last_nonce: Option<u64>,
}

/// Drives bridge transactions between Arbitrum and Base based on the wallet's balances.
#[derive(Debug)]
pub struct BridgeOrchestrator<C> {
    arbitrum: C,
    base: C,
    routes: Routes,
    monitor: BalanceMonitor,
    builder: TransactionBuilder,
    submitter: TransactionSubmitter,
    bridge_amount: U256,
    min_balance: U256,
    timing: TimingConfig,
    arb_to_base: DirectionStats,
    base_to_arb: DirectionStats,
}

impl<C: ChainClient> BridgeOrchestrator<C> {
    /// Creates a new [`BridgeOrchestrator`].
    pub fn new(
        arbitrum: C,
        base: C,
        routes: Routes,
        wallet: Wallet,
        config: &BridgeConfig,
    ) -> Self {
        Self {
            arbitrum,
            base,
            routes,
            monitor: BalanceMonitor::new(wallet.address()),
            builder: TransactionBuilder::new(config.fallback_gas_limit),
            submitter: TransactionSubmitter::new(wallet),
            bridge_amount: config.bridge_amount,
            min_balance: config.min_balance,
            timing: config.timing,
            arb_to_base: DirectionStats::default(),
            base_to_arb: DirectionStats::default(),
        }
    }

    /// Returns the client for `side`.
    pub const fn client(&self, side: Side) -> &C {
        match side {
            Side::Arbitrum => &self.arbitrum,
            Side::Base => &self.base,
        }
    }

    /// Returns the bridge attempts made in `direction`.
    pub const fn stats(&self, direction: Direction) -> &DirectionStats {
        match direction {
            Direction::ArbToBase => &self.arb_to_base,
            Direction::BaseToArb => &self.base_to_arb,
        }
    }

    fn stats_mut(&mut self, direction: Direction) -> &mut DirectionStats {
        match direction {
            Direction::ArbToBase => &mut self.arb_to_base,
            Direction::BaseToArb => &mut self.base_to_arb,
        }
    }

    /// Delay before retrying after an error of the given kind.
    pub const fn recovery_delay(&self, kind: ErrorKind) -> Duration {
        match kind {
            ErrorKind::Connectivity
            | ErrorKind::Balance
            | ErrorKind::Build
            | ErrorKind::Sign
            | ErrorKind::Submission => self.timing.error_backoff,
        }
    }

    /// Runs the loop forever.
    pub async fn run(mut self) {
        info!(wallet = %self.submitter.address(), "Starting bridge loop");

        let mut state = State::Idle;
        loop {
            let transition = self.step(state).await;
            if !transition.pause.is_zero() {
                tokio::time::sleep(transition.pause).await;
            }
            state = transition.next;
        }
    }

    /// Advances the loop by one step from `state`, turning any error into
    /// [`State::ErrorBackoff`] with the delay for its kind.
    pub async fn step(&mut self, state: State) -> Transition {
        match self.advance(state).await {
            Ok(transition) => transition,
            Err(err) => {
                let delay = self.recovery_delay(err.kind());
                error!(%err, "Error. Retrying in {}s", delay.as_secs());
                Transition::now(State::ErrorBackoff(delay))
            }
        }
    }

    /// Advances the loop by one step from `state`.
    ///
    /// Waiting states return the wait as the pause of their transition back to [`State::Idle`].
    pub async fn advance(&mut self, state: State) -> Result<Transition, BridgeError> {
        match state {
            State::Idle => self.check_balances().await,
            State::Drain(direction) => self.drain(direction).await,
            State::ColdWait(delay) | State::ErrorBackoff(delay) => {
                Ok(Transition::after(State::Idle, delay))
            }
        }
    }

    async fn check_balances(&self) -> Result<Transition, BridgeError> {
        let arbitrum = self.monitor.read(&self.arbitrum, Side::Arbitrum).await?;
        let base = self.monitor.read(&self.base, Side::Base).await?;
        info!("{arbitrum}, {base}");

        if !arbitrum.is_drainable(self.min_balance) && !base.is_drainable(self.min_balance) {
            let delay = self.timing.cold_start_delay;
            info!(
                "Both chains under {} ETH; waiting {}s ...",
                format_ether(self.min_balance),
                delay.as_secs()
            );
            return Ok(Transition::now(State::ColdWait(delay)));
        }

        Ok(Transition::now(State::Drain(Direction::ArbToBase)))
    }

    async fn drain(&mut self, direction: Direction) -> Result<Transition, BridgeError> {
        let source = direction.source();
        let balance = self.monitor.read(self.client(source), source).await?;

        if !balance.is_drainable(self.min_balance) {
            let next = match direction.next() {
                Some(next) => State::Drain(next),
                None => {
                    let delay = self.timing.post_drain_delay;
                    info!(
                        "Both chains below {} ETH; waiting {}s before rechecking...",
                        format_ether(self.min_balance),
                        delay.as_secs()
                    );
                    State::ColdWait(delay)
                }
            };
            return Ok(Transition::now(next));
        }

        info!("Bridging {direction} ...");
        let from = self.submitter.address();
        let client = self.client(source);

        let mut draft = self
            .builder
            .build(client, from, self.routes.endpoint(direction), self.bridge_amount)
            .await?;

        // the chain may not reflect the previous transaction yet
        if let Some(last) = self.stats(direction).last_nonce.filter(|last| draft.nonce <= *last) {
            warn!(chain_nonce = draft.nonce, last, "Stale nonce from chain, bumping");
            draft.nonce = last + 1;
        }

        let submission = self.submitter.submit(client, draft.clone()).await?;
        if submission.outcome == Outcome::Fail {
            let reason = explain_failure(client, &draft, from).await;
            warn!(tx_hash = %submission.receipt.tx_hash, %reason, "Bridge transaction failed");
        }

        let stats = self.stats_mut(direction);
        stats.last_nonce = Some(draft.nonce);
        match submission.outcome {
            Outcome::Success => stats.successes += 1,
            Outcome::Fail => stats.failures += 1,
        }

        let delay = self.jitter();
        info!("Waiting {} seconds before next {direction} transaction...", delay.as_secs());
        Ok(Transition::after(State::Drain(direction), delay))
    }

    /// Random pause between two transactions, uniform over the configured range.
    fn jitter(&self) -> Duration {
        let min = self.timing.jitter_min.as_secs();
        let max = self.timing.jitter_max.as_secs().max(min);
        Duration::from_secs(rand::thread_rng().gen_range(min..=max))
    }
}
