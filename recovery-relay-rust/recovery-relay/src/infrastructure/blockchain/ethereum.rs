use crate::infrastructure::blockchain::contracts::{
    balances_helper_address, personal_account_registry_address, BalancesHelper, Erc1155, Erc20, Erc721,
    PersonalAccountRegistry,
};
use crate::infrastructure::blockchain::gateway::{ChainGateway, GatewayFactory, RelayCall, TxOutcome};
use crate::infrastructure::config::{ChainEndpoint, Config};
use crate::infrastructure::logger::Logger;
use async_trait::async_trait;
use ethers::{
    contract::ContractError,
    core::types::{transaction::eip2718::TypedTransaction, Address, BlockNumber, Bytes, TransactionRequest, H256, U256, U64},
    middleware::Middleware,
    providers::{Http, PendingTransaction, Provider, ProviderError, RpcError},
    signers::{LocalWallet, Signer},
};
use recovery_wallet_core::{Chain, RecoveryError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Node error code for `execution reverted`
const REVERT_ERROR_CODE: i64 = 3;

/// Whether a JSON-RPC error response describes a contract revert
pub fn is_revert_response(code: i64, message: &str) -> bool {
    code == REVERT_ERROR_CODE || message.to_lowercase().contains("revert")
}

fn classify_provider_error(method: &str, err: &ProviderError) -> RecoveryError {
    if let Some(response) = RpcError::as_error_response(err) {
        if is_revert_response(response.code, &response.message) {
            return RecoveryError::contract_revert(format!("{}: {}", method, response.message));
        }
    }
    RecoveryError::rpc(format!("{} failed: {}", method, err))
}

fn classify_contract_error(method: &str, err: ContractError<Provider<Http>>) -> RecoveryError {
    match err {
        ContractError::Revert(data) => RecoveryError::contract_revert(format!("{} reverted: {}", method, data)),
        ContractError::DecodingError(e) => RecoveryError::contract_revert(format!("{} returned undecodable data: {}", method, e)),
        ContractError::AbiError(e) => RecoveryError::contract_revert(format!("{} returned undecodable data: {}", method, e)),
        ContractError::DetokenizationError(e) => {
            RecoveryError::contract_revert(format!("{} returned unexpected output: {}", method, e))
        }
        ContractError::MiddlewareError { e } => classify_provider_error(method, &e),
        ContractError::ProviderError { e } => classify_provider_error(method, &e),
        other => RecoveryError::rpc(format!("{} failed: {}", method, other)),
    }
}

/// JSON-RPC gateway for one chain, built from an endpoint snapshot
pub struct EthersGateway {
    chain: Chain,
    chain_id: u64,
    provider: Arc<Provider<Http>>,
    rpc_timeout: Duration,
    confirmation_timeout: Duration,
}

impl EthersGateway {
    pub fn connect(endpoint: &ChainEndpoint, rpc_timeout: Duration, confirmation_timeout: Duration) -> Result<Self, RecoveryError> {
        let provider = Provider::<Http>::try_from(endpoint.rpc_url.as_str())
            .map_err(|e| {
                RecoveryError::configuration(format!("Failed to create HTTP provider for {}: {}", endpoint.chain, e))
            })?
            .interval(POLL_INTERVAL);

        Ok(Self {
            chain: endpoint.chain,
            chain_id: endpoint.chain_id,
            provider: Arc::new(provider),
            rpc_timeout,
            confirmation_timeout,
        })
    }

    async fn timed<T, F>(&self, method: &str, fut: F) -> Result<T, RecoveryError>
    where
        F: Future<Output = Result<T, RecoveryError>>,
    {
        Logger::rpc_call(self.chain, method);
        tokio::time::timeout(self.rpc_timeout, fut)
            .await
            .map_err(|_| {
                RecoveryError::rpc(format!(
                    "{} on {} timed out after {}ms",
                    method,
                    self.chain,
                    self.rpc_timeout.as_millis()
                ))
            })?
    }

    fn request(&self, call: &RelayCall) -> TransactionRequest {
        TransactionRequest::new()
            .from(call.from)
            .to(call.to)
            .value(call.value)
            .data(call.data.clone())
            .chain_id(self.chain_id)
    }
}

#[async_trait]
impl ChainGateway for EthersGateway {
    fn chain(&self) -> Chain {
        self.chain
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, RecoveryError> {
        self.timed("eth_getCode", async {
            self.provider
                .get_code(address, None)
                .await
                .map_err(|e| classify_provider_error("eth_getCode", &e))
        })
        .await
    }

    async fn get_native_balance(&self, account: Address) -> Result<U256, RecoveryError> {
        self.timed("eth_getBalance", async {
            self.provider
                .get_balance(account, None)
                .await
                .map_err(|e| classify_provider_error("eth_getBalance", &e))
        })
        .await
    }

    async fn get_gas_price(&self) -> Result<U256, RecoveryError> {
        self.timed("eth_gasPrice", async {
            self.provider
                .get_gas_price()
                .await
                .map_err(|e| classify_provider_error("eth_gasPrice", &e))
        })
        .await
    }

    async fn compute_account_address(&self, eoa: Address) -> Result<Address, RecoveryError> {
        let registry = PersonalAccountRegistry::new(personal_account_registry_address()?, Arc::clone(&self.provider));
        self.timed("computeAccountAddress", async {
            registry
                .compute_account_address(eoa)
                .call()
                .await
                .map_err(|e| classify_contract_error("computeAccountAddress", e))
        })
        .await
    }

    async fn get_balances(&self, account: Address, tokens: Vec<Address>) -> Result<Vec<U256>, RecoveryError> {
        let helper = BalancesHelper::new(balances_helper_address()?, Arc::clone(&self.provider));
        self.timed("getBalances", async {
            helper
                .get_balances(vec![account], tokens)
                .call()
                .await
                .map_err(|e| classify_contract_error("getBalances", e))
        })
        .await
    }

    async fn get_decimals(&self, token: Address) -> Result<u8, RecoveryError> {
        let erc20 = Erc20::new(token, Arc::clone(&self.provider));
        self.timed("decimals", async {
            erc20.decimals().call().await.map_err(|e| classify_contract_error("decimals", e))
        })
        .await
    }

    async fn get_token_symbol(&self, token: Address) -> Result<String, RecoveryError> {
        let erc20 = Erc20::new(token, Arc::clone(&self.provider));
        self.timed("symbol", async {
            erc20.symbol().call().await.map_err(|e| classify_contract_error("symbol", e))
        })
        .await
    }

    async fn get_token_name(&self, token: Address) -> Result<String, RecoveryError> {
        let erc20 = Erc20::new(token, Arc::clone(&self.provider));
        self.timed("name", async {
            erc20.name().call().await.map_err(|e| classify_contract_error("name", e))
        })
        .await
    }

    async fn erc721_balance_of(&self, nft: Address, account: Address) -> Result<U256, RecoveryError> {
        let erc721 = Erc721::new(nft, Arc::clone(&self.provider));
        self.timed("balanceOf(ERC721)", async {
            erc721
                .balance_of(account)
                .call()
                .await
                .map_err(|e| classify_contract_error("balanceOf(ERC721)", e))
        })
        .await
    }

    async fn erc1155_balance_of(&self, nft: Address, account: Address, id: U256) -> Result<U256, RecoveryError> {
        let erc1155 = Erc1155::new(nft, Arc::clone(&self.provider));
        self.timed("balanceOf(ERC1155)", async {
            erc1155
                .balance_of(account, id)
                .call()
                .await
                .map_err(|e| classify_contract_error("balanceOf(ERC1155)", e))
        })
        .await
    }

    async fn nft_name(&self, nft: Address) -> Result<String, RecoveryError> {
        let erc721 = Erc721::new(nft, Arc::clone(&self.provider));
        self.timed("name(NFT)", async {
            erc721.name().call().await.map_err(|e| classify_contract_error("name(NFT)", e))
        })
        .await
    }

    async fn estimate_gas(&self, call: RelayCall) -> Result<U256, RecoveryError> {
        let tx: TypedTransaction = self.request(&call).into();
        self.timed("eth_estimateGas", async {
            self.provider
                .estimate_gas(&tx, None)
                .await
                .map_err(|e| classify_provider_error("eth_estimateGas", &e))
        })
        .await
    }

    async fn submit(&self, call: RelayCall, signer: LocalWallet) -> Result<H256, RecoveryError> {
        let signer = signer.with_chain_id(self.chain_id);
        if signer.address() != call.from {
            return Err(RecoveryError::validation(format!(
                "Signer {:?} does not match transaction sender {:?}",
                signer.address(),
                call.from
            )));
        }

        let nonce = self
            .timed("eth_getTransactionCount", async {
                self.provider
                    .get_transaction_count(call.from, Some(BlockNumber::Pending.into()))
                    .await
                    .map_err(|e| classify_provider_error("eth_getTransactionCount", &e))
            })
            .await?;
        let gas_price = self.get_gas_price().await?;

        let mut tx: TypedTransaction = self.request(&call).nonce(nonce).gas_price(gas_price).into();
        let gas = self
            .timed("eth_estimateGas", async {
                self.provider
                    .estimate_gas(&tx, None)
                    .await
                    .map_err(|e| classify_provider_error("eth_estimateGas", &e))
            })
            .await?;
        tx.set_gas(gas);

        let signature = signer
            .sign_transaction_sync(&tx)
            .map_err(|e| RecoveryError::crypto(format!("Failed to sign transaction: {}", e)))?;
        let raw = tx.rlp_signed(&signature);

        let pending = self
            .timed("eth_sendRawTransaction", async {
                self.provider
                    .send_raw_transaction(raw)
                    .await
                    .map_err(|e| classify_provider_error("eth_sendRawTransaction", &e))
            })
            .await?;
        let tx_hash = pending.tx_hash();

        Logger::transaction_submitted(self.chain, &format!("{:?}", tx_hash));
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TxOutcome, RecoveryError> {
        let hash = format!("{:?}", tx_hash);
        let pending = PendingTransaction::new(tx_hash, self.provider.as_ref()).interval(POLL_INTERVAL);

        let receipt = tokio::time::timeout(self.confirmation_timeout, pending)
            .await
            .map_err(|_| {
                RecoveryError::confirmation_unknown(
                    hash.clone(),
                    format!("no receipt after {}ms", self.confirmation_timeout.as_millis()),
                )
            })?
            .map_err(|e| RecoveryError::confirmation_unknown(hash.clone(), e.to_string()))?
            .ok_or_else(|| RecoveryError::confirmation_unknown(hash.clone(), "transaction dropped from mempool"))?;

        if receipt.status == Some(U64::zero()) {
            Logger::transaction_failed(self.chain, &hash, "reverted on chain");
            Ok(TxOutcome::Reverted)
        } else {
            Logger::transaction_confirmed(self.chain, &hash);
            Ok(TxOutcome::Success)
        }
    }
}

/// Connects a fresh `EthersGateway` for every endpoint snapshot
#[derive(Debug, Clone)]
pub struct EthersGatewayFactory {
    rpc_timeout: Duration,
    confirmation_timeout: Duration,
}

impl EthersGatewayFactory {
    pub fn new(rpc_timeout: Duration, confirmation_timeout: Duration) -> Self {
        Self {
            rpc_timeout,
            confirmation_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rpc_timeout(), config.confirmation_timeout())
    }
}

impl GatewayFactory for EthersGatewayFactory {
    fn connect(&self, endpoint: &ChainEndpoint) -> Result<Arc<dyn ChainGateway>, RecoveryError> {
        let gateway = EthersGateway::connect(endpoint, self.rpc_timeout, self.confirmation_timeout)?;
        Ok(Arc::new(gateway))
    }
}
