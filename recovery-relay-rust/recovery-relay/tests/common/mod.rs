#![allow(dead_code)]

use async_trait::async_trait;
use ethers::signers::LocalWallet;
use ethers::types::{Address, Bytes, H256, U256};
use recovery_relay::app::recovery_service::RecoveryService;
use recovery_relay::infrastructure::blockchain::gateway::{ChainGateway, GatewayFactory, RelayCall, TxOutcome};
use recovery_relay::infrastructure::config::{ChainEndpoint, ChainRegistry};
use recovery_relay::utils::retry::RetryPolicy;
use recovery_wallet_core::{ArchanovaDirectory, Chain, RecoveryError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
pub const TEST_EOA: &str = "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23";

/// Programmable chain state for one chain
#[derive(Debug, Default)]
pub struct Script {
    pub contracts: Vec<Address>,
    pub token_balances: HashMap<Address, U256>,
    pub native_balances: HashMap<Address, U256>,
    pub decimals: HashMap<Address, u8>,
    pub etherspot_account: Option<Address>,
    pub balance_failures: u32,
    pub erc721_balance: Option<U256>,
    pub erc1155_balance: Option<U256>,
    pub gas: U256,
    pub gas_price: U256,
    pub receipt_lost: bool,
    pub nft_name: Option<String>,
}

#[derive(Debug)]
pub struct ScriptedGateway {
    chain: Chain,
    script: Mutex<Script>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new(chain: Chain, script: Script) -> Self {
        Self {
            chain,
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }
}

#[async_trait]
impl ChainGateway for ScriptedGateway {
    fn chain(&self) -> Chain {
        self.chain
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, RecoveryError> {
        self.record("get_code");
        if self.script.lock().unwrap().contracts.contains(&address) {
            Ok(Bytes::from(vec![0x60, 0x80, 0x60, 0x40]))
        } else {
            Ok(Bytes::default())
        }
    }

    async fn get_native_balance(&self, account: Address) -> Result<U256, RecoveryError> {
        self.record("get_native_balance");
        Ok(self
            .script
            .lock()
            .unwrap()
            .native_balances
            .get(&account)
            .copied()
            .unwrap_or_default())
    }

    async fn get_gas_price(&self) -> Result<U256, RecoveryError> {
        self.record("get_gas_price");
        Ok(self.script.lock().unwrap().gas_price)
    }

    async fn compute_account_address(&self, _eoa: Address) -> Result<Address, RecoveryError> {
        self.record("compute_account_address");
        self.script
            .lock()
            .unwrap()
            .etherspot_account
            .ok_or_else(|| RecoveryError::rpc("registry unavailable"))
    }

    async fn get_balances(&self, _account: Address, tokens: Vec<Address>) -> Result<Vec<U256>, RecoveryError> {
        self.record("get_balances");
        let mut script = self.script.lock().unwrap();
        if script.balance_failures > 0 {
            script.balance_failures -= 1;
            return Err(RecoveryError::rpc("502 Bad Gateway"));
        }
        Ok(tokens
            .iter()
            .map(|token| script.token_balances.get(token).copied().unwrap_or_default())
            .collect())
    }

    async fn get_decimals(&self, token: Address) -> Result<u8, RecoveryError> {
        self.record("get_decimals");
        self.script
            .lock()
            .unwrap()
            .decimals
            .get(&token)
            .copied()
            .ok_or_else(|| RecoveryError::contract_revert("decimals() reverted"))
    }

    async fn get_token_symbol(&self, _token: Address) -> Result<String, RecoveryError> {
        self.record("get_token_symbol");
        Ok("TKN".to_string())
    }

    async fn get_token_name(&self, _token: Address) -> Result<String, RecoveryError> {
        self.record("get_token_name");
        Ok("Token".to_string())
    }

    async fn erc721_balance_of(&self, _nft: Address, _account: Address) -> Result<U256, RecoveryError> {
        self.record("erc721_balance_of");
        self.script
            .lock()
            .unwrap()
            .erc721_balance
            .ok_or_else(|| RecoveryError::contract_revert("execution reverted"))
    }

    async fn erc1155_balance_of(&self, _nft: Address, _account: Address, _id: U256) -> Result<U256, RecoveryError> {
        self.record("erc1155_balance_of");
        self.script
            .lock()
            .unwrap()
            .erc1155_balance
            .ok_or_else(|| RecoveryError::contract_revert("execution reverted"))
    }

    async fn nft_name(&self, _nft: Address) -> Result<String, RecoveryError> {
        self.record("nft_name");
        self.script
            .lock()
            .unwrap()
            .nft_name
            .clone()
            .ok_or_else(|| RecoveryError::contract_revert("no name()"))
    }

    async fn estimate_gas(&self, _call: RelayCall) -> Result<U256, RecoveryError> {
        self.record("estimate_gas");
        Ok(self.script.lock().unwrap().gas)
    }

    async fn submit(&self, _call: RelayCall, _signer: LocalWallet) -> Result<H256, RecoveryError> {
        self.record("submit");
        Ok(H256::repeat_byte(0x42))
    }

    async fn wait_for_receipt(&self, _tx_hash: H256) -> Result<TxOutcome, RecoveryError> {
        self.record("wait_for_receipt");
        if self.script.lock().unwrap().receipt_lost {
            return Err(RecoveryError::rpc("receipt polling timed out"));
        }
        Ok(TxOutcome::Success)
    }
}

/// Hands out the scripted gateway for a chain and remembers which URLs were used
#[derive(Default)]
pub struct ScriptedFactory {
    gateways: HashMap<Chain, Arc<ScriptedGateway>>,
    connected: Mutex<Vec<String>>,
}

impl ScriptedFactory {
    pub fn with(mut self, chain: Chain, script: Script) -> Self {
        self.gateways.insert(chain, Arc::new(ScriptedGateway::new(chain, script)));
        self
    }

    pub fn gateway(&self, chain: Chain) -> Arc<ScriptedGateway> {
        Arc::clone(&self.gateways[&chain])
    }

    pub fn connected_urls(&self) -> Vec<String> {
        self.connected.lock().unwrap().clone()
    }
}

impl GatewayFactory for ScriptedFactory {
    fn connect(&self, endpoint: &ChainEndpoint) -> Result<Arc<dyn ChainGateway>, RecoveryError> {
        self.connected.lock().unwrap().push(endpoint.rpc_url.clone());
        match self.gateways.get(&endpoint.chain) {
            Some(gateway) => Ok(Arc::clone(gateway) as Arc<dyn ChainGateway>),
            None => Ok(Arc::new(ScriptedGateway::new(endpoint.chain, Script::default()))),
        }
    }
}

pub fn service(factory: Arc<ScriptedFactory>, directory: ArchanovaDirectory) -> RecoveryService {
    RecoveryService::new(
        ChainRegistry::with_defaults(),
        factory,
        Arc::new(directory),
        RetryPolicy::immediate(3),
    )
}

pub fn address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}
