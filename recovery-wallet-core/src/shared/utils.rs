//! Utility functions for the recovery core
//!
//! Address validation and exact decimal conversion between base units and
//! human-readable amounts.

use crate::shared::constants::MAX_DECIMALS;
use crate::shared::error::RecoveryError;
use crate::shared::types::Address;
use ethers::types::U256;
use std::str::FromStr;

/// Validate Ethereum address format
pub fn validate_ethereum_address(address: &str) -> Result<(), RecoveryError> {
    if !address.starts_with("0x") {
        return Err(RecoveryError::validation("Address must start with 0x"));
    }

    if address.len() != 42 {
        return Err(RecoveryError::validation("Address must be 42 characters long"));
    }

    // Check if all characters after 0x are valid hex
    if !address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RecoveryError::validation("Address contains invalid hex characters"));
    }

    Ok(())
}

/// Validate and parse an address, accepting any letter case
pub fn parse_address(address: &str) -> Result<Address, RecoveryError> {
    let address = address.trim();
    validate_ethereum_address(address)
        .map_err(|e| RecoveryError::validation(format!("{} ({})", e, address)))?;
    Address::from_str(address)
        .map_err(|e| RecoveryError::validation(format!("Invalid address {}: {}", address, e)))
}

/// Parse a token id given as a decimal or 0x-prefixed hex string
pub fn parse_token_id(token_id: &str) -> Result<U256, RecoveryError> {
    let token_id = token_id.trim();
    let parsed = match token_id.strip_prefix("0x") {
        Some(hex_part) if !hex_part.is_empty() => U256::from_str_radix(hex_part, 16).ok(),
        Some(_) => None,
        None => U256::from_dec_str(token_id).ok(),
    };
    parsed.ok_or_else(|| RecoveryError::validation(format!("Invalid token id: {}", token_id)))
}

/// Format a raw base-unit amount as an exact decimal string
///
/// Trailing fractional zeros are dropped, so `1500000000000000000` with 18
/// decimals becomes `"1.5"` and zero becomes `"0"`.
pub fn format_amount(raw: U256, decimals: u8) -> Result<String, RecoveryError> {
    if decimals > MAX_DECIMALS {
        return Err(RecoveryError::validation(format!("Unsupported decimals: {}", decimals)));
    }

    let amount_str = raw.to_string();
    let decimals = decimals as usize;

    let (whole, fraction) = if amount_str.len() <= decimals {
        // Pad with leading zeros
        let padded = format!("{}{}", "0".repeat(decimals - amount_str.len()), amount_str);
        ("0".to_string(), padded)
    } else {
        let decimal_pos = amount_str.len() - decimals;
        (amount_str[..decimal_pos].to_string(), amount_str[decimal_pos..].to_string())
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        Ok(whole)
    } else {
        Ok(format!("{}.{}", whole, fraction))
    }
}

/// Parse a human-readable decimal amount into base units
///
/// Amounts with more fractional digits than `decimals` are rejected rather
/// than truncated.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, RecoveryError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(RecoveryError::validation("Amount cannot be empty"));
    }
    if decimals > MAX_DECIMALS {
        return Err(RecoveryError::validation(format!("Unsupported decimals: {}", decimals)));
    }

    let parts: Vec<&str> = amount.split('.').collect();
    let (whole, fraction) = match parts.as_slice() {
        [whole] => (*whole, ""),
        [whole, fraction] => (*whole, *fraction),
        _ => return Err(RecoveryError::validation(format!("Invalid amount format: {}", amount))),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(RecoveryError::validation(format!("Invalid amount format: {}", amount)));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(RecoveryError::validation(format!("Invalid amount format: {}", amount)));
    }
    if fraction.len() > decimals as usize {
        return Err(RecoveryError::validation(format!(
            "Amount {} has more than {} decimal places",
            amount, decimals
        )));
    }

    let mut digits = if whole.is_empty() { "0".to_string() } else { whole.to_string() };
    digits.push_str(fraction);
    digits.push_str(&"0".repeat(decimals as usize - fraction.len()));

    U256::from_dec_str(&digits)
        .map_err(|_| RecoveryError::validation(format!("Amount out of range: {}", amount)))
}

/// Lower-case hex form used as the lookup key for address-keyed tables
pub fn address_key(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}
