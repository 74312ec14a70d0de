//! Token lists bundled with the binary, one per chain
//!
//! Each list starts with the native currency under the zero address; the
//! balance service filters that entry out before the batch balance call.

use crate::domain::models::TokenRef;
use recovery_wallet_core::shared::constants::MAX_DECIMALS;
use recovery_wallet_core::shared::utils::parse_address;
use recovery_wallet_core::{Chain, RecoveryError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenListFile {
    #[allow(dead_code)]
    name: String,
    tokens: Vec<TokenListEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenListEntry {
    address: String,
    chain_id: u64,
    decimals: u8,
    name: String,
    symbol: String,
    #[serde(rename = "logoURI", default)]
    logo_uri: Option<String>,
}

fn bundled_source(chain: Chain) -> &'static str {
    match chain {
        Chain::Ethereum => include_str!("../../data/tokens/ethereum.json"),
        Chain::Polygon => include_str!("../../data/tokens/polygon.json"),
        Chain::Optimism => include_str!("../../data/tokens/optimism.json"),
        Chain::Arbitrum => include_str!("../../data/tokens/arbitrum.json"),
        Chain::Binance => include_str!("../../data/tokens/binance.json"),
        Chain::Xdai => include_str!("../../data/tokens/xdai.json"),
    }
}

/// Parse a token list, keeping only entries for `chain`
pub fn parse_token_list(chain: Chain, json: &str) -> Result<Vec<TokenRef>, RecoveryError> {
    let file: TokenListFile = serde_json::from_str(json)
        .map_err(|e| RecoveryError::configuration(format!("Invalid token list for {}: {}", chain, e)))?;

    let mut tokens = Vec::with_capacity(file.tokens.len());
    for entry in file.tokens.into_iter().filter(|entry| entry.chain_id == chain.chain_id()) {
        if entry.decimals > MAX_DECIMALS {
            return Err(RecoveryError::configuration(format!(
                "Token {} on {} declares {} decimals",
                entry.symbol, chain, entry.decimals
            )));
        }
        tokens.push(TokenRef {
            address: parse_address(&entry.address)?,
            chain,
            decimals: entry.decimals,
            symbol: entry.symbol,
            name: entry.name,
            logo_uri: entry.logo_uri,
        });
    }
    Ok(tokens)
}

pub fn bundled_tokens(chain: Chain) -> Result<Vec<TokenRef>, RecoveryError> {
    parse_token_list(chain, bundled_source(chain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_bundled_list_parses() {
        for chain in Chain::ALL {
            let tokens = bundled_tokens(chain).unwrap();
            assert!(tokens.len() > 1, "{} list is empty", chain);
            assert!(tokens[0].address.is_zero(), "{} list must start with the native entry", chain);
            assert_eq!(tokens[0].symbol, chain.native_currency().symbol);
            assert!(tokens.iter().all(|token| token.chain == chain));
        }
    }

    #[test]
    fn test_known_decimals() {
        let tokens = bundled_tokens(Chain::Ethereum).unwrap();
        let usdc = tokens.iter().find(|token| token.symbol == "USDC").unwrap();
        assert_eq!(usdc.decimals, 6);
        let wbtc = tokens.iter().find(|token| token.symbol == "WBTC").unwrap();
        assert_eq!(wbtc.decimals, 8);
    }

    #[test]
    fn test_foreign_chain_entries_are_skipped() {
        let json = r#"{
            "name": "mixed",
            "tokens": [
                {"address": "0x0000000000000000000000000000000000000000", "chainId": 137, "decimals": 18, "name": "Matic", "symbol": "MATIC"},
                {"address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "chainId": 1, "decimals": 6, "name": "USD Coin", "symbol": "USDC"}
            ]
        }"#;
        let tokens = parse_token_list(Chain::Polygon, json).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].symbol, "MATIC");
    }

    #[test]
    fn test_bad_address_is_rejected() {
        let json = r#"{"name": "bad", "tokens": [{"address": "0x12", "chainId": 1, "decimals": 18, "name": "X", "symbol": "X"}]}"#;
        assert!(parse_token_list(Chain::Ethereum, json).is_err());
    }
}
