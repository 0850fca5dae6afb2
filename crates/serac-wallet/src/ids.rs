//! Identifiers: transaction ids, asset ids, chain ids, addresses, node ids
//!
//! Identifiers are fixed-length opaque binary keys; equality is byte
//! equality. 32-byte ids render as checksummed base-58 (payload followed by
//! the last four bytes of its SHA-256 digest). Addresses render as bech32
//! with the network's human-readable part.

use std::fmt;
use std::str::FromStr;

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Length of the checksum appended to base-58 renderings
const CHECKSUM_LEN: usize = 4;

/// Encode bytes as base-58 with a trailing 4-byte SHA-256 checksum
fn to_checked_base58(payload: &[u8]) -> String {
    let digest = Sha256::digest(payload);
    let mut data = payload.to_vec();
    data.extend_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    bs58::encode(data).into_string()
}

/// Decode a checksummed base-58 string, verifying length and checksum
fn from_checked_base58(s: &str, expected_len: usize) -> Result<Vec<u8>> {
    let data = bs58::decode(s)
        .into_vec()
        .map_err(|e| Error::InvalidAddress(format!("bad base-58: {e}")))?;
    if data.len() != expected_len + CHECKSUM_LEN {
        return Err(Error::InvalidAddress(format!(
            "expected {} payload bytes, got {}",
            expected_len,
            data.len().saturating_sub(CHECKSUM_LEN)
        )));
    }
    let (payload, checksum) = data.split_at(expected_len);
    let digest = Sha256::digest(payload);
    if checksum != &digest[digest.len() - CHECKSUM_LEN..] {
        return Err(Error::InvalidAddress("checksum mismatch".to_string()));
    }
    Ok(payload.to_vec())
}

macro_rules! id32 {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// The all-zero identifier
            pub const ZERO: Self = Self([0u8; 32]);

            /// Raw bytes of the identifier
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Whether this is the all-zero identifier
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&to_checked_base58(&self.0))
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let payload = from_checked_base58(s, 32)?;
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(&payload);
                Ok(Self(bytes))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

id32! {
    /// Identifier of a transaction (32 bytes)
    TxId
}

id32! {
    /// Identifier of an asset (32 bytes)
    AssetId
}

id32! {
    /// Identifier of a blockchain (32 bytes)
    BlockchainId
}

/// A 20-byte address: the hash of a public key.
///
/// Addresses print as bech32 with the network HRP; the raw form goes on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Raw bytes of the address
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Render as a bech32 string with the given human-readable part
    pub fn to_bech32(&self, hrp: &str) -> Result<String> {
        let hrp = Hrp::parse(hrp).map_err(|e| Error::InvalidAddress(format!("bad HRP: {e}")))?;
        bech32::encode::<Bech32>(hrp, &self.0)
            .map_err(|e| Error::InvalidAddress(format!("bech32 encode: {e}")))
    }

    /// Parse a bech32 string, requiring the expected human-readable part
    pub fn from_bech32(expected_hrp: &str, s: &str) -> Result<Self> {
        let (hrp, payload) =
            bech32::decode(s).map_err(|e| Error::InvalidAddress(format!("bech32 decode: {e}")))?;
        if hrp.as_str() != expected_hrp {
            return Err(Error::InvalidAddress(format!(
                "address prefix {:?} does not match network prefix {:?}",
                hrp.as_str(),
                expected_hrp
            )));
        }
        if payload.len() != 20 {
            return Err(Error::InvalidAddress(format!(
                "expected 20 payload bytes, got {}",
                payload.len()
            )));
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&payload);
        Ok(Self(bytes))
    }
}

/// Identifier of a validator node (20 bytes).
///
/// Prints as `NodeID-` followed by the checksummed base-58 form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub [u8; 20]);

/// Display prefix for node ids
const NODE_ID_PREFIX: &str = "NodeID-";

impl NodeId {
    /// Raw bytes of the node id
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NODE_ID_PREFIX, to_checked_base58(&self.0))
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let body = s.strip_prefix(NODE_ID_PREFIX).ok_or_else(|| {
            Error::InvalidAddress(format!("node id must start with {NODE_ID_PREFIX:?}"))
        })?;
        let payload = from_checked_base58(body, 20)?;
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&payload);
        Ok(Self(bytes))
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identity of a UTXO: the transaction that created it and the output index
/// within that transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtxoId {
    /// Transaction that created the output
    pub tx_id: TxId,
    /// Index of the output within that transaction
    pub output_index: u32,
}

impl UtxoId {
    /// Create a UTXO identity
    pub fn new(tx_id: TxId, output_index: u32) -> Self {
        Self {
            tx_id,
            output_index,
        }
    }
}
