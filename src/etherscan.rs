use anyhow::{bail, Context, Result};
use ethers::types::Address;
use serde::Deserialize;
use tokio::time::{sleep, Duration};

use crate::types::TransferRecord;

pub const ETHERSCAN_API_URL: &str = "https://api.etherscan.io/api";

/// Etherscan's per-page maximum for `tokentx`.
const PAGE_SIZE: usize = 10_000;
/// Mandatory pacing between page requests, not a retry mechanism.
const PAGE_DELAY: Duration = Duration::from_millis(210);

#[derive(Debug, Deserialize)]
struct TransferResponse {
    status: String,
    message: String,
    result: TransferResult,
}

/// `result` is a record list on success and a plain string on API errors.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TransferResult {
    Records(Vec<TransferRecord>),
    Note(String),
}

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    result: Option<String>,
}

#[derive(Clone)]
pub struct EtherscanClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl EtherscanClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Latest block via the explorer proxy endpoint (hex-encoded result).
    pub async fn latest_block(&self) -> Result<u64> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("module", "proxy"),
                ("action", "eth_blockNumber"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let data: ProxyResponse = resp.json().await?;
        let hex = data.result.context("proxy response missing result")?;
        let digits = hex
            .strip_prefix("0x")
            .context("latest block is not hex encoded")?;
        u64::from_str_radix(digits, 16).context("invalid hex block number")
    }

    /// The complete transfer history for `contract` in the given range,
    /// ascending by block order. Any mid-pagination failure aborts the whole
    /// fetch; the ledger replay needs an uninterrupted history.
    pub async fn token_transfers(
        &self,
        contract: Address,
        start_block: u64,
        end_block: Option<u64>,
    ) -> Result<Vec<TransferRecord>> {
        let mut all = Vec::new();
        let mut page: u32 = 1;
        loop {
            let Some(records) = self
                .transfer_page(contract, start_block, end_block, page)
                .await?
            else {
                break;
            };
            // End-of-data check independent of the "no transactions" message.
            if records.is_empty() {
                break;
            }
            let count = records.len();
            all.extend(records);
            tracing::info!(page, count, total = all.len(), "fetched transfer page");
            if count < PAGE_SIZE {
                break;
            }
            page += 1;
            sleep(PAGE_DELAY).await;
        }
        Ok(all)
    }

    /// One `tokentx` page; `None` when the API reports no transactions.
    async fn transfer_page(
        &self,
        contract: Address,
        start_block: u64,
        end_block: Option<u64>,
        page: u32,
    ) -> Result<Option<Vec<TransferRecord>>> {
        let contract = format!("{contract:?}");
        let page = page.to_string();
        let offset = PAGE_SIZE.to_string();
        let start = start_block.to_string();
        let mut params = vec![
            ("module", "account"),
            ("action", "tokentx"),
            ("contractaddress", contract.as_str()),
            ("page", page.as_str()),
            ("offset", offset.as_str()),
            ("sort", "asc"),
            ("startblock", start.as_str()),
            ("apikey", self.api_key.as_str()),
        ];
        let end;
        if let Some(e) = end_block {
            end = e.to_string();
            params.push(("endblock", end.as_str()));
        }

        let resp = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;
        let data: TransferResponse = resp.json().await?;

        if data.status == "0" && data.message.to_lowercase().starts_with("no transactions") {
            return Ok(None);
        }
        match data.result {
            TransferResult::Records(records) => Ok(Some(records)),
            TransferResult::Note(note) => bail!("etherscan error: {} ({note})", data.message),
        }
    }
}
