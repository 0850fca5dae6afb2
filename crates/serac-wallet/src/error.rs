//! Error types for the wallet engine
//!
//! Selection and build errors are synchronous domain errors: the engine
//! performs no I/O and never retries, since a retry needs fresh input (new
//! UTXOs, corrected parameters) that only the caller can supply.

use crate::ids::{Address, AssetId};
use serac_codec::CodecError;

/// Result type for wallet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wallet engine errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The eligible UTXO set cannot cover the requested amount plus fee
    #[error("insufficient funds for asset {asset_id}: need {needed}, have {available}")]
    InsufficientFunds {
        /// Asset that ran short
        asset_id: AssetId,
        /// Amount plus fee that was required
        needed: u64,
        /// Amount the eligible UTXOs could cover
        available: u64,
    },

    /// Nothing was requested; no transaction is produced for a zero spend
    #[error("nothing to spend: requested amount is zero")]
    NothingToSpend,

    /// Signature threshold exceeds the number of addresses that could sign
    #[error("threshold {threshold} exceeds {addresses} addresses")]
    InvalidThreshold {
        /// Requested threshold
        threshold: u32,
        /// Number of addresses available
        addresses: usize,
    },

    /// A required chain identifier was absent or zero
    #[error("missing required chain id")]
    MissingChain,

    /// Invalid amount
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Amount arithmetic overflowed
    #[error("amount overflow: {0}")]
    AmountOverflow(String),

    /// Memo exceeds the wire-format cap
    #[error("memo of {len} bytes exceeds maximum {max}")]
    MemoTooLarge {
        /// Supplied memo length
        len: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Staking end time is not after the start time
    #[error("invalid stake period: start {start} is not before end {end}")]
    InvalidStakePeriod {
        /// Requested start time (Unix seconds)
        start: u64,
        /// Requested end time (Unix seconds)
        end: u64,
    },

    /// Stake amount below the network minimum
    #[error("stake of {amount} is below the minimum {minimum}")]
    StakeAmountTooLow {
        /// Requested stake amount
        amount: u64,
        /// Network minimum
        minimum: u64,
    },

    /// No signer is known for an address that must authorize an input
    #[error("no signer known for address {address:?}")]
    UnknownSigner {
        /// Address with no registered signer
        address: Address,
    },

    /// Invalid address or identifier string
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Signing failed
    #[error("signing failed: {0}")]
    Signing(String),

    /// Wire encode/decode failure
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl Error {
    /// Get error category for logging/metrics
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InsufficientFunds { .. }
            | Error::NothingToSpend
            | Error::InvalidAmount(_)
            | Error::AmountOverflow(_) => ErrorCategory::Amount,
            Error::InvalidThreshold { .. } | Error::InvalidAddress(_) => ErrorCategory::Address,
            Error::MissingChain | Error::MemoTooLarge { .. } => ErrorCategory::Transaction,
            Error::InvalidStakePeriod { .. } | Error::StakeAmountTooLow { .. } => {
                ErrorCategory::Staking
            }
            Error::UnknownSigner { .. } | Error::Signing(_) => ErrorCategory::Signing,
            Error::Codec(_) => ErrorCategory::Codec,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Amount and selection errors
    Amount,
    /// Address and ownership errors
    Address,
    /// Transaction shape errors
    Transaction,
    /// Staking parameter errors
    Staking,
    /// Signing errors
    Signing,
    /// Wire format errors
    Codec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(Error::NothingToSpend.category(), ErrorCategory::Amount);
        assert_eq!(
            Error::InvalidThreshold {
                threshold: 2,
                addresses: 1
            }
            .category(),
            ErrorCategory::Address
        );
        assert_eq!(Error::MissingChain.category(), ErrorCategory::Transaction);
        assert_eq!(
            Error::Codec(CodecError::UnknownTypeId { id: 9 }).category(),
            ErrorCategory::Codec
        );
    }

    #[test]
    fn test_codec_error_converts() {
        fn decode() -> Result<()> {
            Err(CodecError::UnknownVersion { version: 9 })?;
            Ok(())
        }
        assert!(matches!(decode(), Err(Error::Codec(_))));
    }
}
