mod balances;
mod blocks;
mod config;
mod error;
mod etherscan;
mod output;
mod token;
mod types;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ethers::providers::{Http, Provider};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::error::ScanError;
use crate::etherscan::{EtherscanClient, ETHERSCAN_API_URL};

/// Reconstruct ERC20 holder balances over a block range by replaying
/// Etherscan transfer logs, then rank and chart the top holders.
#[derive(Parser)]
#[command(name = "erc20-holder-scan", version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Fetch transfers, rebuild balances, write CSV tables and charts
    Scan,
    /// Resolve and print the block range without fetching transfers
    Range,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let cfg = config::load()?;
    let provider = Provider::<Http>::try_from(cfg.rpc_url.clone())?;
    let etherscan = EtherscanClient::new(ETHERSCAN_API_URL, cfg.etherscan_api_key.clone());

    match cli.cmd {
        Cmd::Range => {
            let range = blocks::resolve_range(&cfg, &provider, &etherscan).await?;
            match range.end {
                Some(end) => println!("blocks {}..={}", range.start, end),
                None => println!("blocks {}..latest", range.start),
            }
        }
        Cmd::Scan => scan(&cfg, &provider, &etherscan).await?,
    }
    Ok(())
}

async fn scan(
    cfg: &AppConfig,
    provider: &Provider<Http>,
    etherscan: &EtherscanClient,
) -> Result<()> {
    let range = blocks::resolve_range(cfg, provider, etherscan).await?;
    let meta = token::token_metadata(provider, cfg.contract).await;
    info!(
        symbol = %meta.symbol,
        decimals = meta.decimals,
        contract = ?cfg.contract,
        start = range.start,
        end = ?range.end,
        "scanning token transfers"
    );

    let transfers = etherscan
        .token_transfers(cfg.contract, range.start, range.end)
        .await?;
    if transfers.is_empty() {
        return Err(ScanError::NoTransfers.into());
    }

    let ledger = balances::build_ledger(&transfers)?;
    let holders = balances::rank_holders(&ledger, meta.decimals);
    info!(
        transfers = transfers.len(),
        holders = holders.len(),
        "reconstructed balances within the scanned window"
    );

    std::fs::create_dir_all(&cfg.out_dir)?;
    let full_csv = cfg.out_dir.join(format!("holders_{}.csv", meta.symbol));
    output::write_holders_csv(&full_csv, &holders)?;
    info!(path = %full_csv.display(), "wrote holder table");

    let top = balances::top_holders(&holders, cfg.top_n);
    let top_csv = cfg
        .out_dir
        .join(format!("top{}_holders_{}.csv", cfg.top_n, meta.symbol));
    output::write_holders_csv(&top_csv, top)?;

    let bar_png = cfg
        .out_dir
        .join(format!("top{}_holders_{}.png", cfg.top_n, meta.symbol));
    output::bar_chart(&bar_png, top, &meta.symbol)?;
    let pie_png = cfg
        .out_dir
        .join(format!("top{}_holders_share_{}.png", cfg.top_n, meta.symbol));
    output::pie_chart(&pie_png, top, &meta.symbol)?;
    info!(top_n = top.len(), "wrote top-holder table and charts");

    Ok(())
}
