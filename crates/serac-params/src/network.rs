//! Serac network definitions

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Network type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    /// Mainnet
    Mainnet,
    /// Testnet
    Testnet,
    /// Local (development / single-node)
    Local,
}

/// Network configuration
#[derive(Debug, Clone)]
pub struct Network {
    /// Network type
    pub network_type: NetworkType,
    /// Human-readable name
    pub name: &'static str,
    /// Network identifier carried in every transaction
    pub network_id: u32,
    /// Bech32 human-readable part for addresses
    pub hrp: &'static str,
    /// Ticker symbol of the native asset
    pub native_asset_symbol: &'static str,
    /// Flat fee charged per transaction, in nano-units of the native asset
    pub base_tx_fee: u64,
    /// Minimum stake for a validator, in nano-units of the native asset
    pub min_validator_stake: u64,
    /// Minimum stake for a delegation, in nano-units of the native asset
    pub min_delegator_stake: u64,
}

impl Network {
    /// Get mainnet parameters
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            name: "mainnet",
            network_id: 1,
            hrp: "serac",
            native_asset_symbol: "SRC",
            base_tx_fee: 1_000_000,
            min_validator_stake: 2_000_000_000_000,
            min_delegator_stake: 25_000_000_000,
        }
    }

    /// Get testnet parameters
    pub const fn testnet() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            name: "testnet",
            network_id: 5,
            hrp: "test",
            native_asset_symbol: "SRC",
            base_tx_fee: 1_000_000,
            min_validator_stake: 1_000_000_000,
            min_delegator_stake: 1_000_000_000,
        }
    }

    /// Get local network parameters
    pub const fn local() -> Self {
        Self {
            network_type: NetworkType::Local,
            name: "local",
            network_id: 12345,
            hrp: "local",
            native_asset_symbol: "SRC",
            base_tx_fee: 1_000_000,
            min_validator_stake: 1_000_000_000,
            min_delegator_stake: 1_000_000_000,
        }
    }

    /// Get network by type
    pub const fn from_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::testnet(),
            NetworkType::Local => Self::local(),
        }
    }

    /// Resolve a network from a bech32 address prefix
    pub fn from_hrp(hrp: &str) -> Result<Self> {
        match hrp {
            "serac" => Ok(Self::mainnet()),
            "test" => Ok(Self::testnet()),
            "local" => Ok(Self::local()),
            other => Err(Error::UnknownHrp(other.to_string())),
        }
    }
}
