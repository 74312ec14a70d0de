use crate::app::gas_estimator::{nft_transfer_call, prepare_transfer};
use crate::app::nft_resolver::{run_probe, StepOutcome};
use crate::app::relay_call::relay;
use crate::domain::models::{GasQuote, NftStandard, NftTransferIntent, TransferIntent};
use crate::infrastructure::blockchain::gateway::{ChainGateway, TxOutcome};
use crate::infrastructure::logger::Logger;
use ethers::signers::LocalWallet;
use ethers::types::{Address, H256};
use recovery_wallet_core::RecoveryError;

fn confirmation_error(tx_hash: H256, error: RecoveryError) -> RecoveryError {
    match error {
        e @ RecoveryError::ConfirmationUnknown { .. } => e,
        other => RecoveryError::confirmation_unknown(format!("{:?}", tx_hash), other.to_string()),
    }
}

fn reverted(tx_hash: H256) -> RecoveryError {
    RecoveryError::contract_revert(format!("Transaction {:?} was mined but reverted", tx_hash))
}

/// Relay a fungible transfer out of the legacy account and wait for it to be mined
///
/// Nothing is submitted unless the EOA can pay the quoted gas.
pub async fn transfer_asset(
    gateway: &dyn ChainGateway,
    intent: &TransferIntent,
    signer: &LocalWallet,
    eoa: Address,
) -> Result<H256, RecoveryError> {
    let (call, cost) = prepare_transfer(gateway, intent, eoa).await?;
    let balance = gateway.get_native_balance(eoa).await?;
    GasQuote::new(intent.chain, cost, balance)?.ensure_affordable()?;

    let tx_hash = gateway.submit(call, signer.clone()).await?;
    match gateway.wait_for_receipt(tx_hash).await {
        Ok(TxOutcome::Success) => Ok(tx_hash),
        Ok(TxOutcome::Reverted) => Err(reverted(tx_hash)),
        Err(e) => {
            let error = confirmation_error(tx_hash, e);
            Logger::transaction_failed(intent.chain, &format!("{:?}", tx_hash), &error.to_string());
            Err(error)
        }
    }
}

/// Relay `safeTransferFrom`, trying ERC-721 and then ERC-1155 with quantity 1
///
/// ERC-1155 is only tried when the ERC-721 attempt provably moved nothing:
/// it was never accepted by the node, or it was mined and reverted. A lost
/// confirmation stops the transfer.
pub async fn transfer_nft(
    gateway: &dyn ChainGateway,
    intent: &NftTransferIntent,
    signer: &LocalWallet,
    eoa: Address,
) -> Result<(NftStandard, H256), RecoveryError> {
    let state = run_probe("safeTransferFrom", |standard| {
        let signer = signer.clone();
        async move {
            let inner = nft_transfer_call(standard, intent.nft, intent.source, intent.recipient, intent.token_id);
            let call = match relay(intent.scheme, intent.source, eoa, &inner) {
                Ok(call) => call,
                Err(e) => return StepOutcome::Fatal(e),
            };

            let tx_hash = match gateway.submit(call, signer).await {
                Ok(tx_hash) => tx_hash,
                Err(e) => return StepOutcome::Retryable(e),
            };

            match gateway.wait_for_receipt(tx_hash).await {
                Ok(TxOutcome::Success) => StepOutcome::Success(tx_hash),
                Ok(TxOutcome::Reverted) => StepOutcome::Retryable(reverted(tx_hash)),
                Err(e) => StepOutcome::Fatal(confirmation_error(tx_hash, e)),
            }
        }
    })
    .await;

    state.into_result("safeTransferFrom")
}
