//! Entry point for every recovery operation
//!
//! Each call snapshots the endpoint of the chain it touches when it starts and
//! opens its own gateway, so an endpoint update never affects work already in
//! flight.

use crate::app::{address_service, balance_service::BalanceService, contract_probe, gas_estimator, nft_resolver, transfer_service};
use crate::domain::models::{
    ChainHoldings, CustomAsset, GasQuote, Holding, HoldingsView, Identity, NftBalance, NftGasEstimate, NftTransferIntent,
    TokenBalance, TransferIntent, TransferReceipt,
};
use crate::domain::operation::{optional_token_id, EoaParams, Operation};
use crate::infrastructure::blockchain::gateway::{ChainGateway, GatewayFactory};
use crate::infrastructure::config::{ChainEndpoint, ChainRegistry};
use crate::infrastructure::token_list::bundled_tokens;
use crate::utils::retry::RetryPolicy;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, U256};
use futures::future::join_all;
use recovery_wallet_core::shared::utils::{parse_address, parse_token_id};
use recovery_wallet_core::shared::constants::NATIVE_DECIMALS;
use recovery_wallet_core::{resolve_signer, ArchanovaDirectory, Chain, KeyManager, RecoveryError, SecretInput};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub struct RecoveryService {
    registry: ChainRegistry,
    gateways: Arc<dyn GatewayFactory>,
    directory: Arc<ArchanovaDirectory>,
    key_manager: KeyManager,
    balances: BalanceService,
}

fn to_value<T: Serialize>(value: T) -> Result<Value, RecoveryError> {
    Ok(serde_json::to_value(value)?)
}

impl RecoveryService {
    pub fn new(
        registry: ChainRegistry,
        gateways: Arc<dyn GatewayFactory>,
        directory: Arc<ArchanovaDirectory>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            registry,
            gateways,
            directory,
            key_manager: KeyManager::new(),
            balances: BalanceService::new(retry),
        }
    }

    async fn gateway(&self, chain: Chain) -> Result<Arc<dyn ChainGateway>, RecoveryError> {
        let endpoint = self.registry.endpoint(chain).await?;
        self.gateways.connect(&endpoint)
    }

    /// Signing wallet and EOA for a secret; key bytes never leave the secure wrapper
    fn signer(&self, secret: &SecretInput, chain: Chain) -> Result<(LocalWallet, Address), RecoveryError> {
        let (private_key, eoa) = resolve_signer(secret, &self.key_manager)?;
        let wallet = private_key.with_key(|bytes| {
            LocalWallet::from_bytes(bytes).map_err(|e| RecoveryError::crypto(format!("Invalid signing key: {}", e)))
        })?;
        Ok((wallet.with_chain_id(chain.chain_id()), eoa))
    }

    fn resolve_eoa(&self, params: &EoaParams) -> Result<Address, RecoveryError> {
        match (&params.eoa, &params.secret) {
            (Some(eoa), _) => parse_address(eoa),
            (None, Some(secret)) => self.derive_eoa(secret),
            (None, None) => Err(RecoveryError::validation("Either 'eoa' or 'secret' is required")),
        }
    }

    // Identity

    pub fn derive_eoa(&self, secret: &SecretInput) -> Result<Address, RecoveryError> {
        address_service::derive_eoa(&self.key_manager, secret)
    }

    pub async fn derive_etherspot_v1_address(&self, eoa: Address) -> Result<Address, RecoveryError> {
        let gateway = self.gateway(Chain::Ethereum).await?;
        address_service::etherspot_v1_address(gateway.as_ref(), eoa).await
    }

    pub fn derive_archanova_address(&self, eoa: Address) -> Result<Address, RecoveryError> {
        address_service::archanova_address(&self.directory, eoa)
    }

    pub fn archanova_account_id(&self, eoa: Address) -> Result<String, RecoveryError> {
        address_service::archanova_account_id(&self.directory, eoa)
    }

    pub async fn derive_identity(&self, secret: &SecretInput) -> Result<Identity, RecoveryError> {
        let gateway = self.gateway(Chain::Ethereum).await?;
        address_service::identity(&self.key_manager, &self.directory, gateway.as_ref(), secret).await
    }

    // Reads

    pub async fn token_balances(&self, account: Address, tokens: &[Address], chain: Chain) -> Result<Vec<TokenBalance>, RecoveryError> {
        let gateway = self.gateway(chain).await?;
        self.balances
            .token_balances_with_retry(gateway.as_ref(), account, tokens)
            .await
    }

    pub async fn native_balance(&self, account: Address, chain: Chain) -> Result<String, RecoveryError> {
        let gateway = self.gateway(chain).await?;
        self.balances.native_balance(gateway.as_ref(), account).await
    }

    pub async fn decimals(&self, token: Address, chain: Chain) -> Result<u8, RecoveryError> {
        if token.is_zero() {
            return Ok(NATIVE_DECIMALS);
        }
        let gateway = self.gateway(chain).await?;
        self.balances.decimals(gateway.as_ref(), token).await
    }

    pub async fn contract_bytecode(&self, address: Address, chain: Chain) -> Result<Bytes, RecoveryError> {
        let gateway = self.gateway(chain).await?;
        contract_probe::get_contract_bytecode(gateway.as_ref(), address).await
    }

    pub async fn is_contract(&self, address: Address, chain: Chain) -> Result<bool, RecoveryError> {
        let gateway = self.gateway(chain).await?;
        contract_probe::is_contract(gateway.as_ref(), address).await
    }

    pub async fn nft_balance(&self, account: Address, nft: Address, token_id: Option<U256>, chain: Chain) -> Result<NftBalance, RecoveryError> {
        let gateway = self.gateway(chain).await?;
        Ok(nft_resolver::nft_balance(gateway.as_ref(), account, nft, token_id).await)
    }

    pub async fn nft_name(&self, nft: Address, chain: Chain) -> Result<Option<String>, RecoveryError> {
        let gateway = self.gateway(chain).await?;
        Ok(nft_resolver::nft_name(gateway.as_ref(), nft).await)
    }

    /// Holdings on every requested chain, fetched concurrently
    ///
    /// A chain that cannot be read comes back empty with its error; the others
    /// are unaffected. User-added NFT contracts are listed after the tokens.
    pub async fn holdings(&self, account: Address, chains: Option<Vec<Chain>>, custom_assets: Vec<CustomAsset>) -> HoldingsView {
        let mut chains = chains.unwrap_or_else(|| Chain::ALL.to_vec());
        chains.sort();
        chains.dedup();

        let fetches = chains.into_iter().map(|chain| {
            let custom: Vec<CustomAsset> = custom_assets.iter().filter(|asset| asset.chain() == chain).cloned().collect();
            async move {
                match self.chain_holdings(account, chain, custom).await {
                    Ok(holdings) => holdings,
                    Err(e) => ChainHoldings::failed(chain, e.to_string()),
                }
            }
        });

        HoldingsView {
            account,
            chains: join_all(fetches).await,
        }
    }

    async fn chain_holdings(&self, account: Address, chain: Chain, custom: Vec<CustomAsset>) -> Result<ChainHoldings, RecoveryError> {
        let mut tokens = bundled_tokens(chain)?;
        let mut nfts = Vec::new();
        for asset in custom {
            match asset {
                CustomAsset::Token(token) => {
                    if !tokens.iter().any(|known| known.address == token.address) {
                        tokens.push(token);
                    }
                }
                CustomAsset::Nft(nft) => nfts.push(nft),
            }
        }

        let gateway = self.gateway(chain).await?;
        let mut holdings = self.balances.chain_holdings(gateway.as_ref(), account, &tokens).await;
        if holdings.error.is_none() {
            let nft_holdings = nft_resolver::nft_holdings(gateway.as_ref(), account, &nfts).await;
            holdings.holdings.extend(nft_holdings);
        }
        Ok(holdings)
    }

    pub async fn custom_asset_holding(&self, account: Address, token: Address, chain: Chain) -> Result<Holding, RecoveryError> {
        let gateway = self.gateway(chain).await?;
        self.balances.custom_asset_holding(gateway.as_ref(), account, token).await
    }

    // Gas

    pub async fn estimate_transfer_gas(&self, intent: &TransferIntent, secret: &SecretInput) -> Result<String, RecoveryError> {
        let eoa = self.derive_eoa(secret)?;
        let gateway = self.gateway(intent.chain).await?;
        gas_estimator::estimate_transfer_cost(gateway.as_ref(), intent, eoa).await
    }

    pub async fn quote_transfer(&self, intent: &TransferIntent, secret: &SecretInput) -> Result<GasQuote, RecoveryError> {
        let eoa = self.derive_eoa(secret)?;
        let gateway = self.gateway(intent.chain).await?;
        gas_estimator::quote_transfer(gateway.as_ref(), intent, eoa).await
    }

    pub async fn estimate_nft_transfer_gas(
        &self,
        source: Address,
        recipient: Address,
        nft: Address,
        token_id: U256,
        chain: Chain,
    ) -> Result<NftGasEstimate, RecoveryError> {
        let gateway = self.gateway(chain).await?;
        gas_estimator::estimate_nft_transfer_cost(gateway.as_ref(), source, recipient, nft, token_id).await
    }

    // Transfers

    pub async fn transfer_asset(&self, intent: &TransferIntent, secret: &SecretInput) -> Result<TransferReceipt, RecoveryError> {
        let endpoint = self.registry.endpoint(intent.chain).await?;
        let gateway = self.gateways.connect(&endpoint)?;
        let (wallet, eoa) = self.signer(secret, intent.chain)?;

        let tx_hash = transfer_service::transfer_asset(gateway.as_ref(), intent, &wallet, eoa).await?;
        let tx_hash = format!("{:?}", tx_hash);
        info!(chain = %intent.chain, tx_hash = %tx_hash, "Asset transfer confirmed");

        Ok(TransferReceipt {
            chain: intent.chain,
            explorer_url: endpoint.explorer_tx_url(&tx_hash),
            tx_hash,
            standard: None,
        })
    }

    pub async fn transfer_nft(&self, intent: &NftTransferIntent, secret: &SecretInput) -> Result<TransferReceipt, RecoveryError> {
        let endpoint = self.registry.endpoint(intent.chain).await?;
        let gateway = self.gateways.connect(&endpoint)?;
        let (wallet, eoa) = self.signer(secret, intent.chain)?;

        let (standard, tx_hash) = transfer_service::transfer_nft(gateway.as_ref(), intent, &wallet, eoa).await?;
        let tx_hash = format!("{:?}", tx_hash);
        info!(chain = %intent.chain, tx_hash = %tx_hash, "NFT transfer confirmed");

        Ok(TransferReceipt {
            chain: intent.chain,
            explorer_url: endpoint.explorer_tx_url(&tx_hash),
            tx_hash,
            standard: Some(standard),
        })
    }

    // Chain directory

    pub async fn update_chain_endpoint(&self, chain: Chain, rpc_url: &str) -> Result<ChainEndpoint, RecoveryError> {
        self.registry.update_endpoint(chain, rpc_url).await
    }

    pub async fn list_chain_endpoints(&self) -> Vec<ChainEndpoint> {
        self.registry.snapshot().await
    }

    pub async fn replace_chain_endpoints(&self, rpc_urls: HashMap<Chain, String>) -> Result<Vec<ChainEndpoint>, RecoveryError> {
        self.registry.replace_all(rpc_urls).await
    }

    pub async fn explorer_tx_url(&self, chain: Chain, tx_hash: &str) -> Result<String, RecoveryError> {
        let tx_hash = tx_hash.trim();
        let valid = tx_hash.len() == 66
            && tx_hash.starts_with("0x")
            && tx_hash[2..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(RecoveryError::validation(format!("Invalid transaction hash: {}", tx_hash)));
        }
        Ok(self.registry.endpoint(chain).await?.explorer_tx_url(tx_hash))
    }

    /// Run a named operation and serialize its result
    pub async fn execute(&self, operation: Operation) -> Result<Value, RecoveryError> {
        match operation {
            Operation::DeriveEoa(params) => to_value(self.derive_eoa(&params.secret)?),
            Operation::DeriveEtherspotV1Address(params) => {
                let eoa = self.resolve_eoa(&params)?;
                to_value(self.derive_etherspot_v1_address(eoa).await?)
            }
            Operation::DeriveArchanovaAddress(params) => {
                let eoa = self.resolve_eoa(&params)?;
                to_value(self.derive_archanova_address(eoa)?)
            }
            Operation::GetArchanovaAccountId(params) => {
                let eoa = self.resolve_eoa(&params)?;
                to_value(self.archanova_account_id(eoa)?)
            }
            Operation::DeriveIdentity(params) => to_value(self.derive_identity(&params.secret).await?),
            Operation::GetTokenBalances(params) => {
                let account = parse_address(&params.account)?;
                let tokens = params.token_addresses()?;
                to_value(self.token_balances(account, &tokens, params.chain).await?)
            }
            Operation::GetNativeBalance(params) => {
                let account = parse_address(&params.account)?;
                to_value(self.native_balance(account, params.chain).await?)
            }
            Operation::GetDecimals(params) => {
                let token = parse_address(&params.token)?;
                to_value(self.decimals(token, params.chain).await?)
            }
            Operation::GetContractBytecode(params) => {
                let address = parse_address(&params.address)?;
                to_value(self.contract_bytecode(address, params.chain).await?)
            }
            Operation::IsContract(params) => {
                let address = parse_address(&params.address)?;
                to_value(self.is_contract(address, params.chain).await?)
            }
            Operation::GetNftBalance(params) => {
                let account = parse_address(&params.account)?;
                let nft = parse_address(&params.nft)?;
                let token_id = optional_token_id(&params.token_id)?;
                to_value(self.nft_balance(account, nft, token_id, params.chain).await?)
            }
            Operation::GetNftName(params) => {
                let nft = parse_address(&params.nft)?;
                to_value(self.nft_name(nft, params.chain).await?)
            }
            Operation::EstimateTransferGas(params) => {
                let intent = params.intent()?;
                to_value(json!({
                    "estimatedNativeCost": self.estimate_transfer_gas(&intent, &params.secret).await?,
                    "nativeSymbol": intent.chain.native_currency().symbol,
                }))
            }
            Operation::QuoteTransfer(params) => {
                let intent = params.intent()?;
                to_value(self.quote_transfer(&intent, &params.secret).await?)
            }
            Operation::EstimateNftTransferGas(params) => {
                let source = parse_address(&params.source)?;
                let recipient = parse_address(&params.recipient)?;
                let nft = parse_address(&params.nft)?;
                let token_id = parse_token_id(&params.token_id)?;
                to_value(
                    self.estimate_nft_transfer_gas(source, recipient, nft, token_id, params.chain)
                        .await?,
                )
            }
            Operation::TransferAsset(params) => {
                let intent = params.intent()?;
                to_value(self.transfer_asset(&intent, &params.secret).await?)
            }
            Operation::TransferNft(params) => {
                let intent = params.intent()?;
                to_value(self.transfer_nft(&intent, &params.secret).await?)
            }
            Operation::GetHoldings(params) => {
                let account = parse_address(&params.account)?;
                let custom_assets = params
                    .custom_tokens
                    .iter()
                    .map(|asset| asset.custom_asset())
                    .collect::<Result<Vec<_>, _>>()?;
                to_value(self.holdings(account, params.chains, custom_assets).await)
            }
            Operation::GetCustomAssetHolding(params) => {
                let account = parse_address(&params.account)?;
                let token = parse_address(&params.token)?;
                to_value(self.custom_asset_holding(account, token, params.chain).await?)
            }
            Operation::UpdateChainEndpoint(params) => {
                to_value(self.update_chain_endpoint(params.chain, &params.rpc_url).await?)
            }
            Operation::ListChainEndpoints(_) => to_value(self.list_chain_endpoints().await),
            Operation::ReplaceChainEndpoints(params) => to_value(self.replace_chain_endpoints(params.rpc_urls).await?),
            Operation::ExplorerTxUrl(params) => to_value(self.explorer_tx_url(params.chain, &params.tx_hash).await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::blockchain::gateway::MockChainGateway;

    struct MockFactory;

    impl GatewayFactory for MockFactory {
        fn connect(&self, endpoint: &ChainEndpoint) -> Result<Arc<dyn ChainGateway>, RecoveryError> {
            let mut gateway = MockChainGateway::new();
            gateway.expect_chain().return_const(endpoint.chain);
            gateway
                .expect_compute_account_address()
                .returning(|_| Ok(Address::repeat_byte(0xe5)));
            Ok(Arc::new(gateway))
        }
    }

    fn service() -> RecoveryService {
        RecoveryService::new(
            ChainRegistry::with_defaults(),
            Arc::new(MockFactory),
            Arc::new(ArchanovaDirectory::empty()),
            RetryPolicy::immediate(3),
        )
    }

    #[tokio::test]
    async fn test_etherspot_address_from_secret() {
        let operation = Operation::parse(
            "deriveEtherspotV1Address",
            json!({ "secret": "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318" }),
        )
        .unwrap();
        let result = service().execute(operation).await.unwrap();
        assert_eq!(result, json!(format!("{:?}", Address::repeat_byte(0xe5))));
    }

    #[tokio::test]
    async fn test_eoa_or_secret_required() {
        let operation = Operation::parse("deriveArchanovaAddress", json!({})).unwrap();
        let result = service().execute(operation).await;
        assert!(matches!(result, Err(RecoveryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_explorer_url() {
        let hash = format!("0x{}", "ab".repeat(32));
        let url = service().explorer_tx_url(Chain::Xdai, &hash).await.unwrap();
        assert_eq!(url, format!("https://gnosisscan.io/tx/{}", hash));
        assert!(service().explorer_tx_url(Chain::Xdai, "0x1234").await.is_err());
    }

    #[tokio::test]
    async fn test_native_decimals_without_gateway() {
        let decimals = service().decimals(Address::zero(), Chain::Optimism).await.unwrap();
        assert_eq!(decimals, 18);
    }

    #[test]
    fn test_signer_matches_derived_eoa() {
        let service = service();
        let secret = SecretInput::Text("0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".to_string());
        let (wallet, eoa) = service.signer(&secret, Chain::Polygon).unwrap();
        assert_eq!(wallet.address(), eoa);
        assert_eq!(wallet.chain_id(), 137);
    }
}
