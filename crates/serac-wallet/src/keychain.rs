//! Signing seam
//!
//! The engine never touches key material. [`Signer`] is the boundary: the
//! caller supplies one per address, the [`Keychain`] resolves addresses to
//! signers, and [`sign_transaction`] produces one [`Credential`] per input
//! over the exact unsigned bytes the codec emitted.

use std::collections::HashMap;

use serac_codec::{Manager, Writer};
use sha2::{Digest, Sha256};

use crate::codec::{pack_transaction, Codec};
use crate::ids::{Address, TxId};
use crate::txs::Transaction;
use crate::{Error, Result};

/// Length of a recoverable signature in bytes
pub const SIGNATURE_LEN: usize = 65;

/// Produces signatures for one address.
///
/// Implemented by the caller; typically wraps a secp256k1 private key or a
/// hardware device.
pub trait Signer {
    /// The address this signer controls
    fn address(&self) -> Address;

    /// Sign a 32-byte message digest, returning a recoverable signature
    fn sign(&self, digest: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN]>;
}

/// Address-to-signer lookup.
#[derive(Default)]
pub struct Keychain {
    signers: HashMap<Address, Box<dyn Signer>>,
}

impl Keychain {
    /// Create an empty keychain
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a signer under its own address
    pub fn add(&mut self, signer: Box<dyn Signer>) {
        self.signers.insert(signer.address(), signer);
    }

    /// Addresses this keychain can sign for
    pub fn addresses(&self) -> Vec<Address> {
        self.signers.keys().copied().collect()
    }

    fn get(&self, address: &Address) -> Result<&dyn Signer> {
        self.signers
            .get(address)
            .map(|signer| signer.as_ref())
            .ok_or(Error::UnknownSigner { address: *address })
    }
}

/// Signatures authorizing one input, ordered by the input's signer indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// One signature per signer index
    pub signatures: Vec<[u8; SIGNATURE_LEN]>,
}

/// An encoded transaction with its credentials attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The unsigned transaction bytes the signatures cover
    pub unsigned_bytes: Vec<u8>,
    /// One credential per input, in input order
    pub credentials: Vec<Credential>,
    /// SHA-256 of the signed bytes
    pub tx_id: TxId,
}

impl SignedTransaction {
    /// The full signed wire encoding: unsigned bytes followed by the
    /// credential list
    pub fn signed_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_raw(&self.unsigned_bytes);
        w.put_u32(self.credentials.len() as u32);
        for credential in &self.credentials {
            w.put_u32(credential.signatures.len() as u32);
            for signature in &credential.signatures {
                w.put_raw(signature);
            }
        }
        w.into_bytes()
    }
}

/// Sign `tx` with `keychain`, producing one credential per input.
///
/// The signed digest is SHA-256 of the unsigned bytes. Every resolved
/// signer address on every input must be present in the keychain.
pub fn sign_transaction(
    manager: &Manager<Codec>,
    version: u16,
    tx: &Transaction,
    keychain: &Keychain,
) -> Result<SignedTransaction> {
    let unsigned_bytes = pack_transaction(manager, version, tx)?;
    let digest: [u8; 32] = Sha256::digest(&unsigned_bytes).into();

    let mut credentials = Vec::new();
    for input in tx.all_inputs() {
        let mut signatures = Vec::with_capacity(input.signers.len());
        for address in &input.signers {
            let signer = keychain.get(address)?;
            // Signer implementations fail in their own terms (device errors,
            // key errors); normalize them to one signing failure.
            let signature = signer
                .sign(&digest)
                .map_err(|e| Error::Signing(e.to_string()))?;
            signatures.push(signature);
        }
        credentials.push(Credential { signatures });
    }

    let mut signed = SignedTransaction {
        unsigned_bytes,
        credentials,
        tx_id: TxId::ZERO,
    };
    let tx_id = TxId(Sha256::digest(signed.signed_bytes()).into());
    signed.tx_id = tx_id;

    tracing::info!(
        tx_id = %signed.tx_id,
        credentials = signed.credentials.len(),
        "signed transaction"
    );
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{default_manager, CODEC_VERSION};
    use crate::ids::{AssetId, BlockchainId, UtxoId};
    use crate::inputs::{Input, TransferInput, TransferableInput};
    use crate::txs::BaseTxFields;

    struct FakeSigner {
        address: Address,
        fill: u8,
    }

    impl Signer for FakeSigner {
        fn address(&self) -> Address {
            self.address
        }

        fn sign(&self, _digest: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN]> {
            Ok([self.fill; SIGNATURE_LEN])
        }
    }

    fn sample_tx(signers: Vec<Address>) -> Transaction {
        Transaction::Base(BaseTxFields {
            network_id: 1,
            blockchain_id: BlockchainId([0xcc; 32]),
            outputs: vec![],
            inputs: vec![TransferableInput::new(
                UtxoId::new(TxId([3u8; 32]), 0),
                AssetId([1u8; 32]),
                Input::Transfer(TransferInput::new(100, vec![0])),
                signers,
            )],
            memo: vec![],
        })
    }

    #[test]
    fn test_sign_produces_credential_per_input() {
        let manager = default_manager().unwrap();
        let mut keychain = Keychain::new();
        keychain.add(Box::new(FakeSigner {
            address: Address([1u8; 20]),
            fill: 0xab,
        }));

        let tx = sample_tx(vec![Address([1u8; 20])]);
        let signed = sign_transaction(&manager, CODEC_VERSION, &tx, &keychain).unwrap();

        assert_eq!(signed.credentials.len(), 1);
        assert_eq!(signed.credentials[0].signatures, vec![[0xab; 65]]);
        assert!(!signed.tx_id.is_zero());

        // Signed bytes are the unsigned bytes plus the credential list.
        let bytes = signed.signed_bytes();
        assert_eq!(&bytes[..signed.unsigned_bytes.len()], signed.unsigned_bytes);
        assert_eq!(bytes.len(), signed.unsigned_bytes.len() + 4 + 4 + 65);
    }

    struct BrokenSigner {
        address: Address,
    }

    impl Signer for BrokenSigner {
        fn address(&self) -> Address {
            self.address
        }

        fn sign(&self, _digest: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN]> {
            Err(Error::InvalidAmount("device unplugged".to_string()))
        }
    }

    #[test]
    fn test_signer_failure_surfaces_as_signing_error() {
        let manager = default_manager().unwrap();
        let mut keychain = Keychain::new();
        keychain.add(Box::new(BrokenSigner {
            address: Address([1u8; 20]),
        }));

        let tx = sample_tx(vec![Address([1u8; 20])]);
        let result = sign_transaction(&manager, CODEC_VERSION, &tx, &keychain);
        assert!(matches!(
            result,
            Err(Error::Signing(msg)) if msg.contains("device unplugged")
        ));
    }

    #[test]
    fn test_unknown_signer_fails() {
        let manager = default_manager().unwrap();
        let keychain = Keychain::new();

        let tx = sample_tx(vec![Address([1u8; 20])]);
        let result = sign_transaction(&manager, CODEC_VERSION, &tx, &keychain);
        assert!(matches!(
            result,
            Err(Error::UnknownSigner { address }) if address == Address([1u8; 20])
        ));
    }

    #[test]
    fn test_tx_id_changes_with_signature() {
        let manager = default_manager().unwrap();
        let tx = sample_tx(vec![Address([1u8; 20])]);

        let mut a = Keychain::new();
        a.add(Box::new(FakeSigner {
            address: Address([1u8; 20]),
            fill: 0x01,
        }));
        let mut b = Keychain::new();
        b.add(Box::new(FakeSigner {
            address: Address([1u8; 20]),
            fill: 0x02,
        }));

        let signed_a = sign_transaction(&manager, CODEC_VERSION, &tx, &a).unwrap();
        let signed_b = sign_transaction(&manager, CODEC_VERSION, &tx, &b).unwrap();
        assert_eq!(signed_a.unsigned_bytes, signed_b.unsigned_bytes);
        assert_ne!(signed_a.tx_id, signed_b.tx_id);
    }
}
