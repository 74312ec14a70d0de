use crate::app::nft_resolver::{retry_on_error, run_probe};
use crate::app::relay_call::{relay, AccountCall};
use crate::domain::models::{GasQuote, NftGasEstimate, NftStandard, TransferIntent};
use crate::infrastructure::blockchain::gateway::{ChainGateway, RelayCall};
use ethers::types::{Address, U256};
use recovery_wallet_core::shared::constants::{ERC1155_TRANSFER_QUANTITY, NATIVE_DECIMALS};
use recovery_wallet_core::shared::utils::{format_amount, parse_amount};
use recovery_wallet_core::RecoveryError;

/// 18 for the native sentinel, otherwise the token's on-chain `decimals()`
pub async fn resolve_decimals(gateway: &dyn ChainGateway, asset: Address) -> Result<u8, RecoveryError> {
    if asset.is_zero() {
        Ok(NATIVE_DECIMALS)
    } else {
        gateway.get_decimals(asset).await
    }
}

/// The call the legacy account makes for a fungible transfer
pub async fn asset_call(gateway: &dyn ChainGateway, intent: &TransferIntent) -> Result<AccountCall, RecoveryError> {
    let decimals = resolve_decimals(gateway, intent.asset).await?;
    let amount = parse_amount(&intent.amount, decimals)?;
    if amount.is_zero() {
        return Err(RecoveryError::validation("Transfer amount must be greater than zero"));
    }

    Ok(if intent.asset.is_zero() {
        AccountCall::native(intent.recipient, amount)
    } else {
        AccountCall::erc20_transfer(intent.asset, intent.recipient, amount)
    })
}

pub fn gas_cost(gas: U256, gas_price: U256) -> Result<U256, RecoveryError> {
    gas.checked_mul(gas_price)
        .ok_or_else(|| RecoveryError::internal(format!("Gas cost overflow: {} * {}", gas, gas_price)))
}

/// Relay call for `intent` sent by `eoa`, with its cost in wei
pub async fn prepare_transfer(
    gateway: &dyn ChainGateway,
    intent: &TransferIntent,
    eoa: Address,
) -> Result<(RelayCall, U256), RecoveryError> {
    let inner = asset_call(gateway, intent).await?;
    let call = relay(intent.scheme, intent.source, eoa, &inner)?;
    let gas = gateway.estimate_gas(call.clone()).await?;
    let gas_price = gateway.get_gas_price().await?;
    Ok((call, gas_cost(gas, gas_price)?))
}

/// Cost in native units of relaying `intent` from `eoa`
pub async fn estimate_transfer_cost(
    gateway: &dyn ChainGateway,
    intent: &TransferIntent,
    eoa: Address,
) -> Result<String, RecoveryError> {
    let (_, cost) = prepare_transfer(gateway, intent, eoa).await?;
    format_amount(cost, NATIVE_DECIMALS)
}

/// Estimate plus the EOA's native balance and the affordability verdict
pub async fn quote_transfer(gateway: &dyn ChainGateway, intent: &TransferIntent, eoa: Address) -> Result<GasQuote, RecoveryError> {
    let (_, cost) = prepare_transfer(gateway, intent, eoa).await?;
    let balance = gateway.get_native_balance(eoa).await?;
    GasQuote::new(intent.chain, cost, balance)
}

pub fn nft_transfer_call(standard: NftStandard, nft: Address, source: Address, recipient: Address, token_id: U256) -> AccountCall {
    match standard {
        NftStandard::Erc721 => AccountCall::erc721_transfer(nft, source, recipient, token_id),
        NftStandard::Erc1155 => AccountCall::erc1155_transfer(
            nft,
            source,
            recipient,
            token_id,
            U256::from(ERC1155_TRANSFER_QUANTITY),
        ),
    }
}

/// `safeTransferFrom` estimated directly on the NFT contract, 721 then 1155
pub async fn estimate_nft_transfer_cost(
    gateway: &dyn ChainGateway,
    source: Address,
    recipient: Address,
    nft: Address,
    token_id: U256,
) -> Result<NftGasEstimate, RecoveryError> {
    let state = run_probe("safeTransferFrom estimate", |standard| async move {
        let call = nft_transfer_call(standard, nft, source, recipient, token_id).direct(source);
        retry_on_error(gateway.estimate_gas(call).await)
    })
    .await;

    let (standard, gas) = state.into_result("safeTransferFrom estimate")?;
    let gas_price = gateway.get_gas_price().await?;
    Ok(NftGasEstimate {
        estimated_native_cost: format_amount(gas_cost(gas, gas_price)?, NATIVE_DECIMALS)?,
        standard,
    })
}
