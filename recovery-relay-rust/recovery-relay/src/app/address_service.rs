use crate::domain::models::Identity;
use crate::infrastructure::blockchain::gateway::ChainGateway;
use ethers::types::Address;
use recovery_wallet_core::{resolve_signer, ArchanovaDirectory, KeyManager, RecoveryError, SecretInput};
use tracing::debug;

pub fn derive_eoa(key_manager: &KeyManager, secret: &SecretInput) -> Result<Address, RecoveryError> {
    let (_, eoa) = resolve_signer(secret, key_manager)?;
    Ok(eoa)
}

/// Etherspot V1 account address, read from the registry on Ethereum
pub async fn etherspot_v1_address(gateway: &dyn ChainGateway, eoa: Address) -> Result<Address, RecoveryError> {
    gateway.compute_account_address(eoa).await
}

pub fn archanova_address(directory: &ArchanovaDirectory, eoa: Address) -> Result<Address, RecoveryError> {
    directory.archanova_address(&eoa)
}

pub fn archanova_account_id(directory: &ArchanovaDirectory, eoa: Address) -> Result<String, RecoveryError> {
    directory.account_id(&eoa)
}

/// Every address a secret controls; Archanova fields are `None` when unmapped
pub async fn identity(
    key_manager: &KeyManager,
    directory: &ArchanovaDirectory,
    ethereum: &dyn ChainGateway,
    secret: &SecretInput,
) -> Result<Identity, RecoveryError> {
    let eoa = derive_eoa(key_manager, secret)?;
    let etherspot_v1_address = etherspot_v1_address(ethereum, eoa).await?;

    let (archanova_address, archanova_account_id) = match directory.find(&eoa) {
        Some(record) => (Some(directory.archanova_address(&eoa)?), record.account_id.clone()),
        None => {
            debug!(eoa = ?eoa, "No Archanova account mapped");
            (None, None)
        }
    };

    Ok(Identity {
        eoa_address: eoa,
        etherspot_v1_address,
        archanova_address,
        archanova_account_id,
    })
}
