use crate::app::contract_probe::filter_valid_tokens;
use crate::domain::models::{ChainHoldings, Holding, TokenBalance, TokenRef};
use crate::infrastructure::blockchain::gateway::ChainGateway;
use crate::utils::retry::RetryPolicy;
use ethers::types::{Address, U256};
use recovery_wallet_core::shared::constants::{MAX_DECIMALS, NATIVE_DECIMALS};
use recovery_wallet_core::shared::utils::format_amount;
use recovery_wallet_core::RecoveryError;
use std::collections::HashMap;
use tracing::warn;

/// Batched token reads, native reads and per-chain aggregation
#[derive(Debug, Clone, Default)]
pub struct BalanceService {
    retry: RetryPolicy,
}

impl BalanceService {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// One batched read for every deployed token in `tokens`
    ///
    /// Each balance is paired with the filtered token it belongs to.
    pub async fn token_balances(
        &self,
        gateway: &dyn ChainGateway,
        account: Address,
        tokens: &[Address],
    ) -> Result<Vec<TokenBalance>, RecoveryError> {
        let valid = filter_valid_tokens(gateway, tokens).await?;
        if valid.is_empty() {
            return Ok(Vec::new());
        }

        let balances = gateway.get_balances(account, valid.clone()).await?;
        if balances.len() != valid.len() {
            return Err(RecoveryError::contract_revert(format!(
                "getBalances returned {} balances for {} tokens",
                balances.len(),
                valid.len()
            )));
        }

        Ok(valid
            .into_iter()
            .zip(balances)
            .map(|(token, raw)| TokenBalance::new(token, raw))
            .collect())
    }

    /// `token_balances` under the retry policy
    pub async fn token_balances_with_retry(
        &self,
        gateway: &dyn ChainGateway,
        account: Address,
        tokens: &[Address],
    ) -> Result<Vec<TokenBalance>, RecoveryError> {
        self.retry
            .run(gateway.chain(), || self.token_balances(gateway, account, tokens))
            .await
    }

    pub async fn native_balance(&self, gateway: &dyn ChainGateway, account: Address) -> Result<String, RecoveryError> {
        let raw = gateway.get_native_balance(account).await?;
        format_amount(raw, NATIVE_DECIMALS)
    }

    /// 18 for the native sentinel, otherwise the token's own `decimals()`
    pub async fn decimals(&self, gateway: &dyn ChainGateway, token: Address) -> Result<u8, RecoveryError> {
        if token.is_zero() {
            return Ok(NATIVE_DECIMALS);
        }
        gateway.get_decimals(token).await
    }

    /// Holdings for one chain, retried as a unit
    ///
    /// Never fails: after the last attempt the chain comes back empty with the
    /// error attached.
    pub async fn chain_holdings(&self, gateway: &dyn ChainGateway, account: Address, tokens: &[TokenRef]) -> ChainHoldings {
        let chain = gateway.chain();
        let result = self
            .retry
            .run(chain, || self.fetch_chain_holdings(gateway, account, tokens))
            .await;

        match result {
            Ok(holdings) => holdings,
            Err(e) => {
                let message = format!(
                    "Error fetching balances for {} after {} attempts: {}",
                    chain, self.retry.max_attempts, e
                );
                warn!(chain = %chain, "{}", message);
                ChainHoldings::failed(chain, message)
            }
        }
    }

    async fn fetch_chain_holdings(
        &self,
        gateway: &dyn ChainGateway,
        account: Address,
        tokens: &[TokenRef],
    ) -> Result<ChainHoldings, RecoveryError> {
        let chain = gateway.chain();
        let addresses: Vec<Address> = tokens.iter().map(|token| token.address).collect();
        let balances = self.token_balances(gateway, account, &addresses).await?;
        let native_raw = gateway.get_native_balance(account).await?;

        let by_address: HashMap<Address, &TokenRef> = tokens.iter().map(|token| (token.address, token)).collect();
        let mut holdings = vec![Holding::native(chain, native_raw)?];

        for balance in balances {
            let raw = U256::from_dec_str(&balance.raw_balance)
                .map_err(|e| RecoveryError::internal(format!("Unreadable balance {}: {}", balance.raw_balance, e)))?;
            if raw.is_zero() {
                continue;
            }
            let Some(token) = by_address.get(&balance.token) else {
                continue;
            };
            if let Some(holding) = self.token_holding(gateway, token, raw).await {
                holdings.push(holding);
            }
        }

        holdings.retain(Holding::is_positive);

        Ok(ChainHoldings {
            chain,
            holdings,
            native_balance: Some(format_amount(native_raw, NATIVE_DECIMALS)?),
            error: None,
        })
    }

    /// Holding for one token with a non-zero balance
    ///
    /// A token whose decimals cannot be used is skipped with a warning so it
    /// never costs the rest of the chain its holdings.
    async fn token_holding(&self, gateway: &dyn ChainGateway, token: &TokenRef, raw: U256) -> Option<Holding> {
        let chain = gateway.chain();
        let decimals = match gateway.get_decimals(token.address).await {
            Ok(decimals) => decimals,
            Err(e) => {
                warn!(
                    chain = %chain,
                    token = ?token.address,
                    "decimals() unavailable, using listed {}: {}",
                    token.decimals,
                    e
                );
                token.decimals
            }
        };
        if decimals > MAX_DECIMALS {
            warn!(chain = %chain, token = ?token.address, "Skipping token reporting {} decimals", decimals);
            return None;
        }

        let token = with_live_metadata(gateway, token).await;
        match Holding::token(&token, raw, decimals) {
            Ok(holding) => Some(holding),
            Err(e) => {
                warn!(chain = %chain, token = ?token.address, "Skipping token holding: {}", e);
                None
            }
        }
    }

    /// Balance of a single user-added token, with metadata read live
    pub async fn custom_asset_holding(
        &self,
        gateway: &dyn ChainGateway,
        account: Address,
        token: Address,
    ) -> Result<Holding, RecoveryError> {
        let chain = gateway.chain();
        if token.is_zero() {
            let raw = gateway.get_native_balance(account).await?;
            return Holding::native(chain, raw);
        }

        let balances = self.token_balances_with_retry(gateway, account, &[token]).await?;
        let balance = balances
            .into_iter()
            .next()
            .ok_or_else(|| RecoveryError::validation(format!("{:?} is not a token contract on {}", token, chain)))?;
        let raw = U256::from_dec_str(&balance.raw_balance)
            .map_err(|e| RecoveryError::internal(format!("Unreadable balance {}: {}", balance.raw_balance, e)))?;

        let decimals = gateway.get_decimals(token).await?;
        let token_ref = TokenRef {
            address: token,
            chain,
            decimals,
            symbol: String::new(),
            name: String::new(),
            logo_uri: None,
        };
        let token_ref = with_live_metadata(gateway, &token_ref).await;
        Holding::token(&token_ref, raw, decimals)
    }
}

/// Fill an empty symbol or name from the contract; failures leave them empty
async fn with_live_metadata(gateway: &dyn ChainGateway, token: &TokenRef) -> TokenRef {
    let mut token = token.clone();
    if token.symbol.is_empty() {
        token.symbol = gateway.get_token_symbol(token.address).await.unwrap_or_else(|e| {
            warn!(chain = %token.chain, token = ?token.address, "symbol() unavailable: {}", e);
            String::new()
        });
    }
    if token.name.is_empty() {
        token.name = gateway.get_token_name(token.address).await.unwrap_or_else(|e| {
            warn!(chain = %token.chain, token = ?token.address, "name() unavailable: {}", e);
            String::new()
        });
    }
    token
}
