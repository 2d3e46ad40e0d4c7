use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// Both latest-block sources failed; no usable range can be computed.
    #[error("could not determine the latest block via RPC or Etherscan; set START_BLOCK explicitly")]
    LatestBlockUnavailable,
    /// The resolved window contained zero transfers.
    #[error("no transfers found in the scanned range; try a larger DAYS_BACK or a different token")]
    NoTransfers,
}
