//! Named operations accepted at the request boundary
//!
//! A request is `{ "operation": "<name>", "params": { ... } }`. Addresses and
//! amounts arrive as strings and are validated when the operation is turned
//! into a typed intent, so malformed input surfaces as a `Validation` error.

use crate::domain::models::{AccountScheme, AssetKind, CustomAsset, NftRef, NftTransferIntent, TokenRef, TransferIntent};
use ethers::types::{Address, U256};
use recovery_wallet_core::shared::constants::{MAX_DECIMALS, NATIVE_DECIMALS};
use recovery_wallet_core::shared::utils::{parse_address, parse_token_id};
use recovery_wallet_core::{Chain, RecoveryError, SecretInput};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
#[serde(tag = "operation", content = "params")]
pub enum Operation {
    #[serde(rename = "deriveEOA")]
    DeriveEoa(SecretParams),
    #[serde(rename = "deriveEtherspotV1Address")]
    DeriveEtherspotV1Address(EoaParams),
    #[serde(rename = "deriveArchanovaAddress")]
    DeriveArchanovaAddress(EoaParams),
    #[serde(rename = "getArchanovaAccountId")]
    GetArchanovaAccountId(EoaParams),
    #[serde(rename = "deriveIdentity")]
    DeriveIdentity(SecretParams),
    #[serde(rename = "getTokenBalances")]
    GetTokenBalances(TokenBalancesParams),
    #[serde(rename = "getNativeBalance")]
    GetNativeBalance(AccountChainParams),
    #[serde(rename = "getDecimals")]
    GetDecimals(TokenChainParams),
    #[serde(rename = "getContractBytecode")]
    GetContractBytecode(AddressChainParams),
    #[serde(rename = "isContract")]
    IsContract(AddressChainParams),
    #[serde(rename = "getNftBalance")]
    GetNftBalance(NftBalanceParams),
    #[serde(rename = "getNftName")]
    GetNftName(NftNameParams),
    #[serde(rename = "estimateTransferGas")]
    EstimateTransferGas(TransferParams),
    #[serde(rename = "quoteTransfer")]
    QuoteTransfer(TransferParams),
    #[serde(rename = "estimateNftTransferGas")]
    EstimateNftTransferGas(NftGasParams),
    #[serde(rename = "transferAsset")]
    TransferAsset(TransferParams),
    #[serde(rename = "transferNft")]
    TransferNft(NftTransferParams),
    #[serde(rename = "getHoldings")]
    GetHoldings(HoldingsParams),
    #[serde(rename = "getCustomAssetHolding")]
    GetCustomAssetHolding(CustomAssetParams),
    #[serde(rename = "updateChainEndpoint")]
    UpdateChainEndpoint(UpdateEndpointParams),
    #[serde(rename = "listChainEndpoints")]
    ListChainEndpoints(EmptyParams),
    #[serde(rename = "replaceChainEndpoints")]
    ReplaceChainEndpoints(ReplaceEndpointsParams),
    #[serde(rename = "explorerTxUrl")]
    ExplorerTxUrl(ExplorerParams),
}

impl Operation {
    /// Build an operation from its wire name and raw params
    pub fn parse(name: &str, params: serde_json::Value) -> Result<Self, RecoveryError> {
        let params = if params.is_null() {
            serde_json::json!({})
        } else {
            params
        };
        serde_json::from_value(serde_json::json!({ "operation": name, "params": params }))
            .map_err(|e| RecoveryError::validation(format!("Invalid '{}' request: {}", name, e)))
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct EmptyParams {}

#[derive(Debug, Deserialize)]
pub struct SecretParams {
    pub secret: SecretInput,
}

/// Either the EOA itself or the secret it is derived from
#[derive(Debug, Deserialize)]
pub struct EoaParams {
    #[serde(default)]
    pub eoa: Option<String>,
    #[serde(default)]
    pub secret: Option<SecretInput>,
}

#[derive(Debug, Deserialize)]
pub struct TokenBalancesParams {
    pub account: String,
    pub tokens: Vec<String>,
    pub chain: Chain,
}

impl TokenBalancesParams {
    pub fn token_addresses(&self) -> Result<Vec<Address>, RecoveryError> {
        self.tokens.iter().map(|token| parse_address(token)).collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct AccountChainParams {
    pub account: String,
    pub chain: Chain,
}

#[derive(Debug, Deserialize)]
pub struct TokenChainParams {
    pub token: String,
    pub chain: Chain,
}

#[derive(Debug, Deserialize)]
pub struct AddressChainParams {
    pub address: String,
    pub chain: Chain,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftBalanceParams {
    pub account: String,
    pub nft: String,
    #[serde(default)]
    pub token_id: Option<String>,
    pub chain: Chain,
}

#[derive(Debug, Deserialize)]
pub struct NftNameParams {
    pub nft: String,
    pub chain: Chain,
}

#[derive(Debug, Deserialize)]
pub struct TransferParams {
    pub scheme: AccountScheme,
    pub source: String,
    pub asset: String,
    pub recipient: String,
    pub amount: String,
    pub chain: Chain,
    pub secret: SecretInput,
}

impl TransferParams {
    pub fn intent(&self) -> Result<TransferIntent, RecoveryError> {
        Ok(TransferIntent {
            scheme: self.scheme,
            chain: self.chain,
            source: parse_address(&self.source)?,
            asset: parse_address(&self.asset)?,
            recipient: parse_address(&self.recipient)?,
            amount: self.amount.trim().to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftGasParams {
    pub source: String,
    pub recipient: String,
    pub nft: String,
    pub token_id: String,
    pub chain: Chain,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftTransferParams {
    pub scheme: AccountScheme,
    pub source: String,
    pub nft: String,
    pub token_id: String,
    pub recipient: String,
    pub chain: Chain,
    pub secret: SecretInput,
}

impl NftTransferParams {
    pub fn intent(&self) -> Result<NftTransferIntent, RecoveryError> {
        Ok(NftTransferIntent {
            scheme: self.scheme,
            chain: self.chain,
            source: parse_address(&self.source)?,
            nft: parse_address(&self.nft)?,
            token_id: parse_token_id(&self.token_id)?,
            recipient: parse_address(&self.recipient)?,
        })
    }
}

/// A user-added token or NFT contract
///
/// Tokens with an empty symbol or name get them read from the contract when
/// their holding is built.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTokenParam {
    pub address: String,
    pub chain: Chain,
    #[serde(default)]
    pub asset_type: Option<AssetKind>,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "logoURI", default)]
    pub logo_uri: Option<String>,
}

impl CustomTokenParam {
    pub fn token_ref(&self) -> Result<TokenRef, RecoveryError> {
        let address = parse_address(&self.address)?;
        let decimals = self.decimals.unwrap_or(NATIVE_DECIMALS);
        if decimals > MAX_DECIMALS {
            return Err(RecoveryError::validation(format!(
                "Unsupported decimals {} for custom token {}",
                decimals, self.address
            )));
        }
        Ok(TokenRef {
            address,
            chain: self.chain,
            decimals,
            symbol: self.symbol.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
            logo_uri: self.logo_uri.clone(),
        })
    }

    pub fn custom_asset(&self) -> Result<CustomAsset, RecoveryError> {
        match self.asset_type {
            Some(AssetKind::Nft) => Ok(CustomAsset::Nft(NftRef {
                address: parse_address(&self.address)?,
                chain: self.chain,
                token_id: optional_token_id(&self.token_id)?,
                name: self.name.clone(),
            })),
            Some(AssetKind::Native) => Err(RecoveryError::validation("The native coin is always included in holdings")),
            Some(AssetKind::Token) | None => Ok(CustomAsset::Token(self.token_ref()?)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsParams {
    pub account: String,
    #[serde(default)]
    pub chains: Option<Vec<Chain>>,
    #[serde(default)]
    pub custom_tokens: Vec<CustomTokenParam>,
}

#[derive(Debug, Deserialize)]
pub struct CustomAssetParams {
    pub account: String,
    pub token: String,
    pub chain: Chain,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEndpointParams {
    pub chain: Chain,
    pub rpc_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceEndpointsParams {
    pub rpc_urls: HashMap<Chain, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerParams {
    pub chain: Chain,
    pub tx_hash: String,
}

/// Optional token id, validated when present
pub fn optional_token_id(token_id: &Option<String>) -> Result<Option<U256>, RecoveryError> {
    token_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .map(parse_token_id)
        .transpose()
}
