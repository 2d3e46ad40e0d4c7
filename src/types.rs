use serde::{Deserialize, Serialize};

/// One `tokentx` row from the explorer API. Only the fields the ledger
/// consumes plus enough metadata to identify the event; the rest of the
/// wire payload is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub block_number: String,
    pub hash: String,
    pub from: String,
    pub to: String,
    /// Raw token units as a decimal string, pre-decimal-scaling.
    pub value: String,
}

/// Resolved scan range. `end == None` means up to the chain head as
/// interpreted by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: u64,
    pub end: Option<u64>,
}

/// A ranked holder row, balance already scaled by the token's decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holder {
    pub address: String,
    pub balance: f64,
}
