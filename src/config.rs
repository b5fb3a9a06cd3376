use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::builder::DEFAULT_MAX_INPUTS;
use crate::provider::BlockfrostNetwork;

#[derive(Parser, Debug, PartialEq, Eq, Clone)]
pub struct Config {
    #[arg(long, env)]
    pub blockfrost_project_id: String,

    /// The network to use. One of `mainnet`, `preprod` or `preview`.
    #[arg(long, env, value_parser = parse_network, default_value = "mainnet")]
    pub network: BlockfrostNetwork,

    /// Overrides the Blockfrost endpoint derived from `network`, e.g. for a self-hosted instance.
    #[arg(long, env)]
    pub blockfrost_url: Option<String>,

    #[arg(long, env, default_value_t = DEFAULT_MAX_INPUTS)]
    pub max_inputs: usize,
}

fn parse_network(s: &str) -> Result<BlockfrostNetwork, String> {
    match s.to_lowercase().as_ref() {
        "mainnet" => Ok(BlockfrostNetwork::Mainnet),
        "preprod" => Ok(BlockfrostNetwork::Preprod),
        "preview" => Ok(BlockfrostNetwork::Preview),
        s => Err(format!(
            "Invalid network: {}, valid networks are: `mainnet`, `preprod`, `preview`",
            s
        )),
    }
}

impl Config {
    /// Reads the configuration from the environment, loading a `.env` file first if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::try_parse_from(["stakehose"]).context("failed to read configuration from environment")
    }

    pub fn blockfrost_url(&self) -> String {
        self.blockfrost_url
            .clone()
            .unwrap_or_else(|| self.network.base_url().to_string())
    }
}

/// Installs a fmt subscriber filtered by `RUST_LOG`. Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
