//! Bridger configuration.
use alloy::primitives::{Address, Bytes, ChainId, U256};
use eyre::{ensure, WrapErr};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use url::Url;

/// Bridger configuration.
///
/// Loaded once at startup. The private key is not part of the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Arbitrum endpoint and the Arbitrum to Base bridge route.
    pub arbitrum: ChainConfig,
    /// Base endpoint and the Base to Arbitrum bridge route.
    pub base: ChainConfig,
    /// Amount bridged per transaction, in ether.
    #[serde(with = "ether")]
    pub bridge_amount: U256,
    /// Minimum balance, in ether, for a chain to be drained.
    #[serde(with = "ether")]
    pub min_balance: U256,
    /// Gas limit used when estimation fails.
    pub fallback_gas_limit: u64,
    /// Loop timing.
    #[serde(default)]
    pub timing: TimingConfig,
}

impl BridgeConfig {
    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the bridger cannot run with.
    pub fn validate(&self) -> eyre::Result<()> {
        ensure!(!self.bridge_amount.is_zero(), "bridge amount must be greater than zero");
        ensure!(self.fallback_gas_limit > 0, "fallback gas limit must be greater than zero");
        ensure!(
            self.timing.jitter_min <= self.timing.jitter_max,
            "jitter range is empty: {:?} > {:?}",
            self.timing.jitter_min,
            self.timing.jitter_max
        );
        Ok(())
    }
}

/// Configuration of one chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// HTTP JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Bridge contract on this chain.
    pub bridge_contract: Address,
    /// Pre-encoded calldata for the bridge call.
    pub calldata: Bytes,
    /// Expected chain id. Checked at startup if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
}

/// Pauses of the bridging loop, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait when both chains are below the minimum balance at the start of a cycle.
    #[serde(with = "duration_secs")]
    pub cold_start_delay: Duration,
    /// Wait after both chains were drained.
    #[serde(with = "duration_secs")]
    pub post_drain_delay: Duration,
    /// Wait after a failed cycle.
    #[serde(with = "duration_secs")]
    pub error_backoff: Duration,
    /// Lower bound of the pause between two bridge transactions.
    #[serde(with = "duration_secs")]
    pub jitter_min: Duration,
    /// Upper bound of the pause between two bridge transactions.
    #[serde(with = "duration_secs")]
    pub jitter_max: Duration,
    /// Maximum time to wait for a receipt. Waits forever if unset.
    #[serde(with = "option_duration_secs", skip_serializing_if = "Option::is_none")]
    pub receipt_timeout: Option<Duration>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            cold_start_delay: Duration::from_secs(30),
            post_drain_delay: Duration::from_secs(60),
            error_backoff: Duration::from_secs(30),
            jitter_min: Duration::from_secs(10),
            jitter_max: Duration::from_secs(30),
            receipt_timeout: None,
        }
    }
}

/// Serializes wei amounts as decimal ether strings.
mod ether {
    use alloy::primitives::{
        utils::{format_ether, parse_ether},
        U256,
    };
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        amount: &U256,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_ether(*amount))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<U256, D::Error> {
        let amount = String::deserialize(deserializer)?;
        parse_ether(amount.trim()).map_err(D::Error::custom)
    }
}

/// Serializes [`Duration`] as seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(
        duration: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

mod option_duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match duration {
            Some(duration) => serializer.serialize_some(&duration.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}
