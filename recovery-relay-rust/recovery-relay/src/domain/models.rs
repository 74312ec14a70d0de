use ethers::types::{Address, U256};
use recovery_wallet_core::shared::constants::NATIVE_DECIMALS;
use recovery_wallet_core::shared::utils::format_amount;
use recovery_wallet_core::{Chain, RecoveryError};
use serde::{Deserialize, Serialize};

/// Legacy smart-account factory scheme
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccountScheme {
    #[serde(rename = "etherspot-v1", alias = "etherspot")]
    EtherspotV1,
    #[serde(rename = "archanova")]
    Archanova,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Native,
    Token,
    Nft,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NftStandard {
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC1155")]
    Erc1155,
}

/// Token metadata from a bundled list or a user-added asset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenRef {
    pub address: Address,
    pub chain: Chain,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
    #[serde(rename = "logoURI", default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
}

/// A user-added NFT contract to report in holdings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftRef {
    pub address: Address,
    pub chain: Chain,
    pub token_id: Option<U256>,
    pub name: Option<String>,
}

/// User-added asset for the holdings view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomAsset {
    Token(TokenRef),
    Nft(NftRef),
}

impl CustomAsset {
    pub fn chain(&self) -> Chain {
        match self {
            CustomAsset::Token(token) => token.chain,
            CustomAsset::Nft(nft) => nft.chain,
        }
    }
}

/// A raw balance paired with the token it belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub token: Address,
    pub raw_balance: String,
}

impl TokenBalance {
    pub fn new(token: Address, raw: U256) -> Self {
        Self {
            token,
            raw_balance: raw.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub chain: Chain,
    pub asset_kind: AssetKind,
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    pub raw_balance: String,
    pub human_balance: String,
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
}

impl Holding {
    pub fn native(chain: Chain, raw: U256) -> Result<Self, RecoveryError> {
        let native = chain.native_currency();
        Ok(Self {
            chain,
            asset_kind: AssetKind::Native,
            address: Address::zero(),
            token_id: None,
            raw_balance: raw.to_string(),
            human_balance: format_amount(raw, NATIVE_DECIMALS)?,
            decimals: NATIVE_DECIMALS,
            symbol: Some(native.symbol),
            name: Some(native.name),
            logo_uri: None,
        })
    }

    pub fn token(token: &TokenRef, raw: U256, decimals: u8) -> Result<Self, RecoveryError> {
        Ok(Self {
            chain: token.chain,
            asset_kind: AssetKind::Token,
            address: token.address,
            token_id: None,
            raw_balance: raw.to_string(),
            human_balance: format_amount(raw, decimals)?,
            decimals,
            symbol: Some(token.symbol.clone()),
            name: Some(token.name.clone()),
            logo_uri: token.logo_uri.clone(),
        })
    }

    pub fn nft(chain: Chain, nft: Address, token_id: Option<U256>, count: U256, name: Option<String>) -> Self {
        Self {
            chain,
            asset_kind: AssetKind::Nft,
            address: nft,
            token_id: token_id.map(|id| id.to_string()),
            raw_balance: count.to_string(),
            human_balance: count.to_string(),
            decimals: 0,
            symbol: None,
            name,
            logo_uri: None,
        }
    }

    /// `humanBalance > 0`, decided on the exact base-unit value
    pub fn is_positive(&self) -> bool {
        U256::from_dec_str(&self.raw_balance)
            .map(|raw| !raw.is_zero())
            .unwrap_or(false)
    }
}

/// Holdings for one chain; `error` is set when the chain could not be read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainHoldings {
    pub chain: Chain,
    pub holdings: Vec<Holding>,
    pub native_balance: Option<String>,
    pub error: Option<String>,
}

impl ChainHoldings {
    pub fn failed(chain: Chain, error: impl Into<String>) -> Self {
        Self {
            chain,
            holdings: Vec::new(),
            native_balance: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsView {
    pub account: Address,
    pub chains: Vec<ChainHoldings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub eoa_address: Address,
    pub etherspot_v1_address: Address,
    pub archanova_address: Option<Address>,
    pub archanova_account_id: Option<String>,
}

/// A fungible transfer out of a legacy account; the zero address is the native asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    pub scheme: AccountScheme,
    pub chain: Chain,
    pub source: Address,
    pub asset: Address,
    pub recipient: Address,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftTransferIntent {
    pub scheme: AccountScheme,
    pub chain: Chain,
    pub source: Address,
    pub nft: Address,
    pub token_id: U256,
    pub recipient: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GasQuote {
    pub chain: Chain,
    pub native_symbol: String,
    pub estimated_native_cost: String,
    pub current_native_balance: String,
    pub is_affordable: bool,
    pub estimated_cost_wei: String,
    pub native_balance_wei: String,
}

impl GasQuote {
    /// Affordability is decided on base units, never on the formatted strings
    pub fn new(chain: Chain, estimated_cost: U256, native_balance: U256) -> Result<Self, RecoveryError> {
        Ok(Self {
            chain,
            native_symbol: chain.native_currency().symbol,
            estimated_native_cost: format_amount(estimated_cost, NATIVE_DECIMALS)?,
            current_native_balance: format_amount(native_balance, NATIVE_DECIMALS)?,
            is_affordable: estimated_cost <= native_balance,
            estimated_cost_wei: estimated_cost.to_string(),
            native_balance_wei: native_balance.to_string(),
        })
    }

    pub fn ensure_affordable(&self) -> Result<(), RecoveryError> {
        if self.is_affordable {
            Ok(())
        } else {
            Err(RecoveryError::insufficient_gas_funds(
                format!("{} {}", self.estimated_native_cost, self.native_symbol),
                format!("{} {}", self.current_native_balance, self.native_symbol),
            ))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NftBalance {
    pub count: String,
    pub standard: Option<NftStandard>,
}

impl NftBalance {
    pub fn none() -> Self {
        Self {
            count: "0".to_string(),
            standard: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NftGasEstimate {
    pub estimated_native_cost: String,
    pub standard: NftStandard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub chain: Chain,
    pub tx_hash: String,
    pub explorer_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<NftStandard>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use recovery_wallet_core::shared::utils::parse_amount;

    #[test]
    fn test_affordability_is_exact() {
        let cost = parse_amount("1.0000001", 18).unwrap();
        let balance = parse_amount("1.0", 18).unwrap();
        let quote = GasQuote::new(Chain::Ethereum, cost, balance).unwrap();
        assert!(!quote.is_affordable);
        assert_eq!(quote.estimated_native_cost, "1.0000001");
        assert_eq!(quote.current_native_balance, "1");

        let quote = GasQuote::new(Chain::Ethereum, balance, balance).unwrap();
        assert!(quote.is_affordable);
        assert!(quote.ensure_affordable().is_ok());
    }

    #[test]
    fn test_unaffordable_quote_reports_insufficient_funds() {
        let cost = parse_amount("0.002", 18).unwrap();
        let balance = parse_amount("0.001", 18).unwrap();
        let quote = GasQuote::new(Chain::Polygon, cost, balance).unwrap();
        match quote.ensure_affordable() {
            Err(RecoveryError::InsufficientGasFunds { required, available }) => {
                assert_eq!(required, "0.002 MATIC");
                assert_eq!(available, "0.001 MATIC");
            }
            other => panic!("expected insufficient funds, got {:?}", other),
        }
    }

    #[test]
    fn test_holding_positivity() {
        let zero = Holding::native(Chain::Xdai, U256::zero()).unwrap();
        assert!(!zero.is_positive());
        let dust = Holding::native(Chain::Xdai, U256::one()).unwrap();
        assert!(dust.is_positive());
        assert_eq!(dust.human_balance, "0.000000000000000001");
        assert_eq!(dust.symbol.as_deref(), Some("XDAI"));
    }

    #[test]
    fn test_token_holding_normalizes_with_decimals() {
        let token = TokenRef {
            address: Address::repeat_byte(0x11),
            chain: Chain::Polygon,
            decimals: 6,
            symbol: "USDC".to_string(),
            name: "USD Coin".to_string(),
            logo_uri: None,
        };
        let holding = Holding::token(&token, U256::from(1_234_500u64), 6).unwrap();
        assert_eq!(holding.human_balance, "1.2345");
        assert_eq!(holding.asset_kind, AssetKind::Token);
    }

    #[test]
    fn test_scheme_wire_names() {
        assert_eq!(serde_json::to_string(&AccountScheme::EtherspotV1).unwrap(), "\"etherspot-v1\"");
        let scheme: AccountScheme = serde_json::from_str("\"archanova\"").unwrap();
        assert_eq!(scheme, AccountScheme::Archanova);
        let scheme: AccountScheme = serde_json::from_str("\"etherspot\"").unwrap();
        assert_eq!(scheme, AccountScheme::EtherspotV1);
    }
}
