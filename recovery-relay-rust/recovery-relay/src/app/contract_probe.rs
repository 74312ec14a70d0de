use crate::infrastructure::blockchain::gateway::ChainGateway;
use ethers::types::{Address, Bytes};
use recovery_wallet_core::RecoveryError;

/// Raw deployed bytecode, `0x` for an externally owned or empty address
pub async fn get_contract_bytecode(gateway: &dyn ChainGateway, address: Address) -> Result<Bytes, RecoveryError> {
    gateway.get_code(address).await
}

pub async fn is_contract(gateway: &dyn ChainGateway, address: Address) -> Result<bool, RecoveryError> {
    Ok(!gateway.get_code(address).await?.is_empty())
}

/// Drop the native sentinel and any address without deployed code
///
/// Order is preserved. A failing code lookup fails the whole filter so the
/// caller can retry the chain.
pub async fn filter_valid_tokens(gateway: &dyn ChainGateway, tokens: &[Address]) -> Result<Vec<Address>, RecoveryError> {
    let mut valid = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.is_zero() || valid.contains(token) {
            continue;
        }
        if is_contract(gateway, *token).await? {
            valid.push(*token);
        }
    }
    Ok(valid)
}
