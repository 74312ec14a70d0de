//! Read-only bindings for the contracts the recovery engine queries
//!
//! Each binding lives in its own module so the generated items do not clash.

use ethers::types::Address;
use recovery_wallet_core::shared::constants::{ETHERSPOT_V1_BALANCES_HELPER_V2, ETHERSPOT_V1_PERSONAL_ACCOUNT_REGISTRY};
use recovery_wallet_core::shared::utils::parse_address;
use recovery_wallet_core::RecoveryError;

mod registry {
    ethers::contract::abigen!(
        PersonalAccountRegistry,
        r#"[
            function computeAccountAddress(address saltOwner) external view returns (address)
        ]"#
    );
}

mod balances_helper {
    ethers::contract::abigen!(
        BalancesHelper,
        r#"[
            function getBalances(address[] accounts, address[] tokens) external view returns (uint256[])
        ]"#
    );
}

mod erc20 {
    ethers::contract::abigen!(
        Erc20,
        r#"[
            function decimals() external view returns (uint8)
            function symbol() external view returns (string)
            function name() external view returns (string)
        ]"#
    );
}

mod erc721 {
    ethers::contract::abigen!(
        Erc721,
        r#"[
            function balanceOf(address owner) external view returns (uint256)
            function name() external view returns (string)
        ]"#
    );
}

mod erc1155 {
    ethers::contract::abigen!(
        Erc1155,
        r#"[
            function balanceOf(address account, uint256 id) external view returns (uint256)
        ]"#
    );
}

pub use balances_helper::BalancesHelper;
pub use erc1155::Erc1155;
pub use erc20::Erc20;
pub use erc721::Erc721;
pub use registry::PersonalAccountRegistry;

/// Etherspot V1 personal account registry, same address on every chain
pub fn personal_account_registry_address() -> Result<Address, RecoveryError> {
    parse_address(ETHERSPOT_V1_PERSONAL_ACCOUNT_REGISTRY)
}

pub fn balances_helper_address() -> Result<Address, RecoveryError> {
    parse_address(ETHERSPOT_V1_BALANCES_HELPER_V2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_addresses_parse() {
        assert!(!personal_account_registry_address().unwrap().is_zero());
        assert!(!balances_helper_address().unwrap().is_zero());
        assert_ne!(personal_account_registry_address().unwrap(), balances_helper_address().unwrap());
    }
}
