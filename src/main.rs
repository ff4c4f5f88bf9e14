use bridger::{
    chain::{self, verify_contract_code, ChainEndpoint, Routes, Side},
    config::BridgeConfig,
    orchestrator::BridgeOrchestrator,
    wallet::Wallet,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Bridges ETH back and forth between Arbitrum and Base.
#[derive(Parser)]
#[command(author, about = "Bridger", long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long, value_name = "PATH", env = "BRIDGER_CONFIG", default_value = "bridger.yaml")]
    config: PathBuf,
    /// The secret key to sign bridge transactions with.
    #[arg(long, value_name = "SECRET_KEY", env = "BRIDGER_PRIVATE_KEY", hide_env_values = true)]
    private_key: String,
}

impl Args {
    async fn run(self) -> eyre::Result<()> {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .init();

        let config = BridgeConfig::load_from_file(&self.config)?;
        let wallet = Wallet::from_private_key(&self.private_key)?;

        let receipt_timeout = config.timing.receipt_timeout;
        let arbitrum = chain::connect(config.arbitrum.rpc_url.clone(), receipt_timeout).await?;
        let base = chain::connect(config.base.rpc_url.clone(), receipt_timeout).await?;

        let routes = Routes {
            arb_to_base: ChainEndpoint::resolve(&arbitrum, &config.arbitrum).await?,
            base_to_arb: ChainEndpoint::resolve(&base, &config.base).await?,
        };

        verify_contract_code(
            &arbitrum,
            routes.arb_to_base.bridge_contract,
            &Side::Arbitrum.to_string(),
        )
        .await?;
        verify_contract_code(&base, routes.base_to_arb.bridge_contract, &Side::Base.to_string())
            .await?;

        info!(wallet = %wallet.address(), "Using wallet");

        BridgeOrchestrator::new(arbitrum, base, routes, wallet, &config).run().await;

        Ok(())
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    Args::parse().run().await
}
