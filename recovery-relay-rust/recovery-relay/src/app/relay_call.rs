//! Calldata for the underlying asset movement and for the relay wrapper
//!
//! The legacy account executes the inner call; the EOA only sends the outer
//! relay transaction and pays its gas.

use crate::domain::models::AccountScheme;
use crate::infrastructure::blockchain::contracts::personal_account_registry_address;
use crate::infrastructure::blockchain::gateway::RelayCall;
use ethers::abi::{encode, Token};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::id;
use recovery_wallet_core::RecoveryError;

pub const ERC20_TRANSFER: &str = "transfer(address,uint256)";
pub const ERC721_SAFE_TRANSFER_FROM: &str = "safeTransferFrom(address,address,uint256)";
pub const ERC1155_SAFE_TRANSFER_FROM: &str = "safeTransferFrom(address,address,uint256,uint256,bytes)";
pub const EXECUTE_ACCOUNT_TRANSACTION: &str = "executeAccountTransaction(address,address,uint256,bytes)";
pub const EXECUTE_TRANSACTION: &str = "executeTransaction(address,uint256,bytes)";

/// Selector followed by the ABI-encoded arguments
pub fn encode_call(signature: &str, args: &[Token]) -> Bytes {
    let mut data = id(signature).to_vec();
    data.extend(encode(args));
    Bytes::from(data)
}

/// The call the legacy account itself makes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCall {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl AccountCall {
    pub fn native(recipient: Address, amount: U256) -> Self {
        Self {
            to: recipient,
            value: amount,
            data: Bytes::default(),
        }
    }

    pub fn erc20_transfer(token: Address, recipient: Address, amount: U256) -> Self {
        Self {
            to: token,
            value: U256::zero(),
            data: encode_call(ERC20_TRANSFER, &[Token::Address(recipient), Token::Uint(amount)]),
        }
    }

    pub fn erc721_transfer(nft: Address, source: Address, recipient: Address, token_id: U256) -> Self {
        Self {
            to: nft,
            value: U256::zero(),
            data: encode_call(
                ERC721_SAFE_TRANSFER_FROM,
                &[Token::Address(source), Token::Address(recipient), Token::Uint(token_id)],
            ),
        }
    }

    pub fn erc1155_transfer(nft: Address, source: Address, recipient: Address, token_id: U256, quantity: U256) -> Self {
        Self {
            to: nft,
            value: U256::zero(),
            data: encode_call(
                ERC1155_SAFE_TRANSFER_FROM,
                &[
                    Token::Address(source),
                    Token::Address(recipient),
                    Token::Uint(token_id),
                    Token::Uint(quantity),
                    Token::Bytes(Vec::new()),
                ],
            ),
        }
    }

    /// Send this call straight from `from`, without a relay
    pub fn direct(&self, from: Address) -> RelayCall {
        RelayCall {
            from,
            to: self.to,
            value: self.value,
            data: self.data.clone(),
        }
    }
}

/// Wrap `call` in the scheme's relay entry point, sent by `eoa`
///
/// Etherspot V1 routes through the shared personal account registry;
/// Archanova calls the account contract at `source` directly.
pub fn relay(scheme: AccountScheme, source: Address, eoa: Address, call: &AccountCall) -> Result<RelayCall, RecoveryError> {
    let (to, data) = match scheme {
        AccountScheme::EtherspotV1 => (
            personal_account_registry_address()?,
            encode_call(
                EXECUTE_ACCOUNT_TRANSACTION,
                &[
                    Token::Address(source),
                    Token::Address(call.to),
                    Token::Uint(call.value),
                    Token::Bytes(call.data.to_vec()),
                ],
            ),
        ),
        AccountScheme::Archanova => (
            source,
            encode_call(
                EXECUTE_TRANSACTION,
                &[Token::Address(call.to), Token::Uint(call.value), Token::Bytes(call.data.to_vec())],
            ),
        ),
    };

    Ok(RelayCall {
        from: eoa,
        to,
        value: U256::zero(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_standard_selectors() {
        assert_eq!(&id(ERC20_TRANSFER), &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(&id(ERC721_SAFE_TRANSFER_FROM), &[0x42, 0x84, 0x2e, 0x0e]);
        assert_eq!(&id(ERC1155_SAFE_TRANSFER_FROM), &[0xf2, 0x42, 0x43, 0x2a]);
    }

    #[test]
    fn test_erc20_transfer_calldata() {
        let call = AccountCall::erc20_transfer(addr(0xaa), addr(0xbb), U256::from(1_000_000u64));
        assert_eq!(call.to, addr(0xaa));
        assert!(call.value.is_zero());
        assert_eq!(call.data.len(), 4 + 32 * 2);
        assert_eq!(&call.data[16..36], addr(0xbb).as_bytes());
        assert_eq!(U256::from_big_endian(&call.data[36..68]), U256::from(1_000_000u64));
    }

    #[test]
    fn test_native_transfer_has_empty_payload() {
        let call = AccountCall::native(addr(0xbb), U256::exp10(18));
        assert_eq!(call.to, addr(0xbb));
        assert_eq!(call.value, U256::exp10(18));
        assert!(call.data.is_empty());
    }

    #[test]
    fn test_archanova_relay_targets_source_account() {
        let source = addr(0x11);
        let eoa = addr(0x22);
        let inner = AccountCall::native(addr(0xbb), U256::from(5u64));
        let outer = relay(AccountScheme::Archanova, source, eoa, &inner).unwrap();

        assert_eq!(outer.from, eoa);
        assert_eq!(outer.to, source);
        assert!(outer.value.is_zero());
        assert_eq!(&outer.data[..4], &id(EXECUTE_TRANSACTION));
        // selector + (to, value, offset, length) with an empty payload
        assert_eq!(outer.data.len(), 4 + 32 * 4);
    }

    #[test]
    fn test_etherspot_relay_targets_registry() {
        let source = addr(0x11);
        let eoa = addr(0x22);
        let inner = AccountCall::native(addr(0xbb), U256::from(5u64));
        let outer = relay(AccountScheme::EtherspotV1, source, eoa, &inner).unwrap();

        assert_eq!(outer.to, personal_account_registry_address().unwrap());
        assert_eq!(&outer.data[..4], &id(EXECUTE_ACCOUNT_TRANSACTION));
        assert_eq!(outer.data.len(), 4 + 32 * 5);
        assert_eq!(&outer.data[16..36], source.as_bytes());
    }

    #[test]
    fn test_relay_carries_token_payload() {
        let inner = AccountCall::erc20_transfer(addr(0xaa), addr(0xbb), U256::one());
        let outer = relay(AccountScheme::Archanova, addr(0x11), addr(0x22), &inner).unwrap();
        // 68 byte payload padded to 96
        assert_eq!(outer.data.len(), 4 + 32 * 4 + 96);
    }

    #[test]
    fn test_erc1155_transfer_calldata() {
        let call = AccountCall::erc1155_transfer(addr(0xcc), addr(0x11), addr(0xbb), U256::from(7u64), U256::one());
        assert_eq!(&call.data[..4], &id(ERC1155_SAFE_TRANSFER_FROM));
        // five head words plus the empty bytes length word
        assert_eq!(call.data.len(), 4 + 32 * 6);
        let direct = call.direct(addr(0x11));
        assert_eq!(direct.from, addr(0x11));
        assert_eq!(direct.to, addr(0xcc));
    }
}
