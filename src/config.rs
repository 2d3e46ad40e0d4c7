use anyhow::{Context, Result};
use ethers::types::Address;
use std::{env, path::PathBuf, str::FromStr};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub etherscan_api_key: String,
    pub rpc_url: String,
    pub contract: Address,
    pub start_block: Option<u64>,
    pub end_block: Option<u64>,
    pub top_n: usize,
    pub days_back: u64,
    pub out_dir: PathBuf,
}

fn optional_block(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => {
            let parsed = v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{name} is not a valid block number"))?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}

pub fn load() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    Ok(AppConfig {
        etherscan_api_key: env::var("ETHERSCAN_API_KEY").context("ETHERSCAN_API_KEY not set")?,
        rpc_url: env::var("RPC_URL").unwrap_or_else(|_| "https://cloudflare-eth.com".into()),
        contract: Address::from_str(
            env::var("CONTRACT_ADDRESS")
                .context("CONTRACT_ADDRESS not set")?
                .trim(),
        )
        .context("CONTRACT_ADDRESS is not a valid ERC20 contract address")?,
        start_block: optional_block("START_BLOCK")?,
        end_block: optional_block("END_BLOCK")?,
        top_n: env::var("TOP_N").ok().and_then(|v| v.parse().ok()).unwrap_or(20),
        days_back: env::var("DAYS_BACK").ok().and_then(|v| v.parse().ok()).unwrap_or(14),
        out_dir: env::var("OUT_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(".")),
    })
}
