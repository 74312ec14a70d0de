use crate::infrastructure::config::ChainEndpoint;
use async_trait::async_trait;
use ethers::signers::LocalWallet;
use ethers::types::{Address, Bytes, H256, U256};
use recovery_wallet_core::{Chain, RecoveryError};
use std::sync::Arc;

/// A transaction as sent by the EOA: `from` pays gas, `to` receives the call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayCall {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Success,
    Reverted,
}

/// Everything the recovery engine needs from one chain
///
/// Contract reverts come back as `RecoveryError::ContractRevert`, transport
/// and node failures as `RecoveryError::Rpc`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainGateway: Send + Sync {
    fn chain(&self) -> Chain;

    async fn get_code(&self, address: Address) -> Result<Bytes, RecoveryError>;

    async fn get_native_balance(&self, account: Address) -> Result<U256, RecoveryError>;

    async fn get_gas_price(&self) -> Result<U256, RecoveryError>;

    /// Etherspot V1 counterfactual account address for an EOA
    async fn compute_account_address(&self, eoa: Address) -> Result<Address, RecoveryError>;

    /// Batched ERC20 balances, one entry per token in request order
    async fn get_balances(&self, account: Address, tokens: Vec<Address>) -> Result<Vec<U256>, RecoveryError>;

    async fn get_decimals(&self, token: Address) -> Result<u8, RecoveryError>;

    async fn get_token_symbol(&self, token: Address) -> Result<String, RecoveryError>;

    async fn get_token_name(&self, token: Address) -> Result<String, RecoveryError>;

    async fn erc721_balance_of(&self, nft: Address, account: Address) -> Result<U256, RecoveryError>;

    async fn erc1155_balance_of(&self, nft: Address, account: Address, id: U256) -> Result<U256, RecoveryError>;

    async fn nft_name(&self, nft: Address) -> Result<String, RecoveryError>;

    async fn estimate_gas(&self, call: RelayCall) -> Result<U256, RecoveryError>;

    /// Sign with `signer` and broadcast; returns once the node accepted the transaction
    async fn submit(&self, call: RelayCall, signer: LocalWallet) -> Result<H256, RecoveryError>;

    /// Wait for the receipt of a submitted transaction
    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TxOutcome, RecoveryError>;
}

/// Opens a gateway for an endpoint snapshot
pub trait GatewayFactory: Send + Sync {
    fn connect(&self, endpoint: &ChainEndpoint) -> Result<Arc<dyn ChainGateway>, RecoveryError>;
}
