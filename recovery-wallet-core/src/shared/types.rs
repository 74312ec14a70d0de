use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::RecoveryError;

pub type Address = ethers::types::Address;

/// Supported chains: Ethereum, Polygon, Optimism, Arbitrum, BNB Smart Chain, Gnosis
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Polygon,
    Optimism,
    Arbitrum,
    Binance,
    Xdai,
}

/// Native currency metadata for a chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Chain {
    pub const ALL: [Chain; 6] = [
        Chain::Ethereum,
        Chain::Polygon,
        Chain::Optimism,
        Chain::Arbitrum,
        Chain::Binance,
        Chain::Xdai,
    ];

    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Polygon => 137,
            Chain::Optimism => 10,
            Chain::Arbitrum => 42161,
            Chain::Binance => 56,
            Chain::Xdai => 100,
        }
    }

    /// Identifier used on the wire and in environment variable names
    pub fn key(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Polygon => "polygon",
            Chain::Optimism => "optimism",
            Chain::Arbitrum => "arbitrum",
            Chain::Binance => "binance",
            Chain::Xdai => "xdai",
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Chain::Ethereum => "https://ethereum-rpc.publicnode.com",
            Chain::Polygon => "https://polygon-rpc.com",
            Chain::Optimism => "https://optimism-rpc.publicnode.com",
            Chain::Arbitrum => "https://arb1.arbitrum.io/rpc",
            Chain::Binance => "https://bsc-dataseed1.binance.org",
            Chain::Xdai => "https://rpc.gnosischain.com",
        }
    }

    pub fn native_currency(&self) -> NativeCurrency {
        let (name, symbol) = match self {
            Chain::Ethereum | Chain::Optimism | Chain::Arbitrum => ("Ether", "ETH"),
            Chain::Polygon => ("MATIC", "MATIC"),
            Chain::Binance => ("Binance Coin", "BNB"),
            Chain::Xdai => ("xDai", "XDAI"),
        };
        NativeCurrency {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: crate::shared::constants::NATIVE_DECIMALS,
        }
    }

    pub fn explorer_tx_base(&self) -> &'static str {
        match self {
            Chain::Ethereum => "https://etherscan.io/tx/",
            Chain::Polygon => "https://polygonscan.com/tx/",
            Chain::Optimism => "https://optimistic.etherscan.io/tx/",
            Chain::Arbitrum => "https://arbiscan.io/tx/",
            Chain::Binance => "https://bscscan.com/tx/",
            Chain::Xdai => "https://gnosisscan.io/tx/",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Chain {
    type Err = RecoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ethereum" | "mainnet" => Ok(Chain::Ethereum),
            "polygon" => Ok(Chain::Polygon),
            "optimism" => Ok(Chain::Optimism),
            "arbitrum" => Ok(Chain::Arbitrum),
            "binance" | "bsc" => Ok(Chain::Binance),
            "xdai" | "gnosis" => Ok(Chain::Xdai),
            other => Err(RecoveryError::configuration(format!("Unsupported chain: {}", other))),
        }
    }
}
