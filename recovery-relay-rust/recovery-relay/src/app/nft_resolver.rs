//! ERC-721 / ERC-1155 resolution by probing
//!
//! A contract is treated as ERC-721 when the 721 call succeeds, and only
//! then is ERC-1155 tried. There is no ERC-165 introspection, so a contract
//! implementing both standards resolves as ERC-721.

use crate::domain::models::{Holding, NftBalance, NftRef, NftStandard};
use crate::infrastructure::blockchain::gateway::ChainGateway;
use ethers::types::{Address, U256};
use recovery_wallet_core::RecoveryError;
use std::future::Future;
use tracing::warn;

/// Result of one probe step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome<T> {
    Success(T),
    /// The step failed in a way that proves nothing moved; the next standard may be tried
    Retryable(RecoveryError),
    /// Stop probing
    Fatal(RecoveryError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeState<T> {
    Untried,
    TriedErc721 { error: RecoveryError },
    Done { standard: NftStandard, value: T },
    Failed { erc721: RecoveryError, erc1155: RecoveryError },
    Halted(RecoveryError),
}

impl<T> ProbeState<T> {
    /// The standard to try next, `None` once the probe is finished
    pub fn next_standard(&self) -> Option<NftStandard> {
        match self {
            ProbeState::Untried => Some(NftStandard::Erc721),
            ProbeState::TriedErc721 { .. } => Some(NftStandard::Erc1155),
            _ => None,
        }
    }

    pub fn advance(self, standard: NftStandard, outcome: StepOutcome<T>) -> Self {
        match (self, outcome) {
            (state @ (ProbeState::Done { .. } | ProbeState::Failed { .. } | ProbeState::Halted(_)), _) => state,
            (_, StepOutcome::Success(value)) => ProbeState::Done { standard, value },
            (_, StepOutcome::Fatal(error)) => ProbeState::Halted(error),
            (ProbeState::Untried, StepOutcome::Retryable(error)) => ProbeState::TriedErc721 { error },
            (ProbeState::TriedErc721 { error: erc721 }, StepOutcome::Retryable(erc1155)) => {
                ProbeState::Failed { erc721, erc1155 }
            }
        }
    }

    pub fn into_result(self, what: &str) -> Result<(NftStandard, T), RecoveryError> {
        match self {
            ProbeState::Done { standard, value } => Ok((standard, value)),
            ProbeState::Halted(error) => Err(error),
            ProbeState::Failed { erc721, erc1155 } => {
                let message = format!("{} failed as ERC721 ({}) and as ERC1155 ({})", what, erc721, erc1155);
                if erc721.is_revert() && erc1155.is_revert() {
                    Err(RecoveryError::contract_revert(message))
                } else {
                    Err(RecoveryError::rpc(message))
                }
            }
            ProbeState::Untried | ProbeState::TriedErc721 { .. } => {
                Err(RecoveryError::internal(format!("{} probe stopped early", what)))
            }
        }
    }
}

/// Drive `step` through ERC-721 then ERC-1155 until one succeeds or both fail
pub async fn run_probe<T, F, Fut>(what: &str, mut step: F) -> ProbeState<T>
where
    F: FnMut(NftStandard) -> Fut,
    Fut: Future<Output = StepOutcome<T>>,
{
    let mut state = ProbeState::Untried;
    while let Some(standard) = state.next_standard() {
        let outcome = step(standard).await;
        if let (NftStandard::Erc721, StepOutcome::Retryable(error)) = (standard, &outcome) {
            warn!("{} as ERC721 failed, trying ERC1155: {}", what, error);
        }
        state = state.advance(standard, outcome);
    }
    state
}

/// Any error is a reason to try the other standard
pub fn retry_on_error<T>(result: Result<T, RecoveryError>) -> StepOutcome<T> {
    match result {
        Ok(value) => StepOutcome::Success(value),
        Err(error) => StepOutcome::Retryable(error),
    }
}

async fn probe_balance(
    gateway: &dyn ChainGateway,
    account: Address,
    nft: Address,
    token_id: Option<U256>,
) -> Result<(NftStandard, U256), RecoveryError> {
    run_probe("balanceOf", |standard| async move {
        match standard {
            NftStandard::Erc721 => retry_on_error(gateway.erc721_balance_of(nft, account).await),
            NftStandard::Erc1155 => match token_id {
                Some(id) => retry_on_error(gateway.erc1155_balance_of(nft, account, id).await),
                None => StepOutcome::Retryable(RecoveryError::validation("ERC1155 balanceOf needs a token id")),
            },
        }
    })
    .await
    .into_result("balanceOf")
}

/// Number of tokens `account` holds; 0 with a warning when neither standard answers
pub async fn nft_balance(
    gateway: &dyn ChainGateway,
    account: Address,
    nft: Address,
    token_id: Option<U256>,
) -> NftBalance {
    match probe_balance(gateway, account, nft, token_id).await {
        Ok((standard, count)) => NftBalance {
            count: count.to_string(),
            standard: Some(standard),
        },
        Err(e) => {
            warn!(chain = %gateway.chain(), nft = ?nft, "No NFT balance found: {}", e);
            NftBalance::none()
        }
    }
}

/// Holdings for user-added NFT contracts; unheld or unreadable ones are left out
pub async fn nft_holdings(gateway: &dyn ChainGateway, account: Address, nfts: &[NftRef]) -> Vec<Holding> {
    let mut holdings = Vec::new();
    for nft in nfts {
        let count = match probe_balance(gateway, account, nft.address, nft.token_id).await {
            Ok((_, count)) if !count.is_zero() => count,
            Ok(_) => continue,
            Err(e) => {
                warn!(chain = %gateway.chain(), nft = ?nft.address, "Skipping NFT holding: {}", e);
                continue;
            }
        };
        let name = match &nft.name {
            Some(name) => Some(name.clone()),
            None => nft_name(gateway, nft.address).await,
        };
        holdings.push(Holding::nft(gateway.chain(), nft.address, nft.token_id, count, name));
    }
    holdings
}

pub async fn nft_name(gateway: &dyn ChainGateway, nft: Address) -> Option<String> {
    match gateway.nft_name(nft).await {
        Ok(name) => Some(name),
        Err(e) => {
            warn!(chain = %gateway.chain(), nft = ?nft, "NFT name unavailable: {}", e);
            None
        }
    }
}
