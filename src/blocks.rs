use anyhow::Result;
use ethers::providers::{Http, Middleware, Provider};
use tracing::warn;

use crate::{config::AppConfig, error::ScanError, etherscan::EtherscanClient, types::BlockRange};

/// ~12s average block time.
pub const BLOCKS_PER_DAY: u64 = 7200;

pub fn estimate_start_block(latest: u64, days_back: u64) -> u64 {
    latest.saturating_sub(days_back * BLOCKS_PER_DAY)
}

async fn latest_block_via_rpc(provider: &Provider<Http>) -> Option<u64> {
    match provider.get_block_number().await {
        Ok(n) => Some(n.as_u64()),
        Err(e) => {
            warn!(error = %e, "RPC latest block failed");
            None
        }
    }
}

async fn latest_block_via_etherscan(etherscan: &EtherscanClient) -> Option<u64> {
    match etherscan.latest_block().await {
        Ok(n) => Some(n),
        Err(e) => {
            warn!(error = %e, "Etherscan proxy latest block failed");
            None
        }
    }
}

/// Resolve the scan range. An explicit start block wins; otherwise the start
/// is estimated from the latest block and the lookback window, trying the
/// live RPC first and the explorer proxy second.
pub async fn resolve_range(
    cfg: &AppConfig,
    provider: &Provider<Http>,
    etherscan: &EtherscanClient,
) -> Result<BlockRange> {
    let start = match cfg.start_block {
        Some(start) => start,
        None => {
            let mut latest = latest_block_via_rpc(provider).await;
            if latest.is_none() {
                latest = latest_block_via_etherscan(etherscan).await;
            }
            let latest = latest.ok_or(ScanError::LatestBlockUnavailable)?;
            let start = estimate_start_block(latest, cfg.days_back);
            tracing::info!(latest, days_back = cfg.days_back, start, "auto-resolved start block");
            start
        }
    };
    Ok(BlockRange { start, end: cfg.end_block })
}
