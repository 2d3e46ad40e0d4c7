use anyhow::{bail, Context, Result};
use ethers::abi::{decode, ParamType};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{transaction::eip2718::TypedTransaction, Address, Bytes, TransactionRequest, U256};
use tracing::warn;

pub const DEFAULT_SYMBOL: &str = "TOKEN";
pub const DEFAULT_DECIMALS: u8 = 18;

#[derive(Debug, Clone)]
pub struct TokenMeta {
    pub symbol: String,
    pub decimals: u8,
}

/// Minimal ERC20 read: 4-byte selector call, no ABI bindings.
async fn read_call(provider: &Provider<Http>, contract: Address, signature: &str) -> Result<Bytes> {
    let selector = ethers::utils::id(signature).to_vec();
    let tx: TypedTransaction = TransactionRequest::new().to(contract).data(selector).into();
    provider
        .call(&tx, None)
        .await
        .with_context(|| format!("{signature} call failed"))
}

async fn read_symbol(provider: &Provider<Http>, contract: Address) -> Result<String> {
    let bytes = read_call(provider, contract, "symbol()").await?;
    let tokens = decode(&[ParamType::String], &bytes).context("symbol() returned undecodable bytes")?;
    tokens
        .into_iter()
        .next()
        .and_then(|t| t.into_string())
        .context("symbol() returned no string")
}

async fn read_decimals(provider: &Provider<Http>, contract: Address) -> Result<u8> {
    let bytes = read_call(provider, contract, "decimals()").await?;
    if bytes.is_empty() {
        bail!("decimals() returned no data");
    }
    let word = &bytes[bytes.len().saturating_sub(32)..];
    Ok(U256::from_big_endian(word).low_u32() as u8)
}

/// Read symbol and decimals, each independently optional. These are display
/// labels, not correctness-critical, so failures fall back to defaults
/// instead of aborting the run.
pub async fn token_metadata(provider: &Provider<Http>, contract: Address) -> TokenMeta {
    let symbol = match read_symbol(provider, contract).await {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "falling back to default symbol");
            DEFAULT_SYMBOL.to_string()
        }
    };
    let decimals = match read_decimals(provider, contract).await {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, "falling back to default decimals");
            DEFAULT_DECIMALS
        }
    };
    TokenMeta { symbol, decimals }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers as m;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn rpc_result(hex: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": hex,
        }))
    }

    #[tokio::test]
    async fn reads_symbol_and_decimals() {
        let server = MockServer::start().await;
        // decimals() selector
        Mock::given(m::method("POST"))
            .and(m::body_string_contains("313ce567"))
            .respond_with(rpc_result(
                "0x0000000000000000000000000000000000000000000000000000000000000006",
            ))
            .mount(&server)
            .await;
        // symbol() selector; ABI-encoded string "USDT"
        Mock::given(m::method("POST"))
            .and(m::body_string_contains("95d89b41"))
            .respond_with(rpc_result(concat!(
                "0x",
                "0000000000000000000000000000000000000000000000000000000000000020",
                "0000000000000000000000000000000000000000000000000000000000000004",
                "5553445400000000000000000000000000000000000000000000000000000000",
            )))
            .mount(&server)
            .await;

        let provider = Provider::<Http>::try_from(server.uri()).unwrap();
        let meta = token_metadata(&provider, Address::zero()).await;
        assert_eq!(meta.symbol, "USDT");
        assert_eq!(meta.decimals, 6);
    }

    #[tokio::test]
    async fn metadata_falls_back_to_defaults() {
        let server = MockServer::start().await;
        Mock::given(m::method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = Provider::<Http>::try_from(server.uri()).unwrap();
        let meta = token_metadata(&provider, Address::zero()).await;
        assert_eq!(meta.symbol, DEFAULT_SYMBOL);
        assert_eq!(meta.decimals, DEFAULT_DECIMALS);
    }
}
