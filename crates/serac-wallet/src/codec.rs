//! Wire codec registration
//!
//! One [`Codec`] is the full registry set for a single wire version: one
//! registry per polymorphic family (outputs, inputs, transactions), all
//! sharing a single wire-id numbering space. Slots belonging to another
//! family appear as reserved holes so the numbering stays aligned.
//!
//! Version 0 numbering:
//!
//! | id | kind                  |
//! |----|-----------------------|
//! | 0  | output owners         |
//! | 1  | transfer output       |
//! | 2  | transfer input        |
//! | 3  | stakeable lock output |
//! | 4  | stakeable lock input  |
//! | 5  | base tx               |
//! | 6  | import tx             |
//! | 7  | export tx             |
//! | 8  | add validator tx      |
//! | 9  | add delegator tx      |

use serac_codec::{Manager, Registry};

use crate::inputs::{
    read_stakeable_lock_in, read_transfer_input, Input, STAKEABLE_LOCK_IN_TAG, TRANSFER_INPUT_TAG,
};
use crate::outputs::{
    read_output_owners, read_stakeable_lock_out, read_transfer_output, Output, OUTPUT_OWNERS_TAG,
    STAKEABLE_LOCK_OUT_TAG, TRANSFER_OUTPUT_TAG,
};
use crate::txs::{
    read_add_delegator_tx, read_add_validator_tx, read_base_tx, read_export_tx, read_import_tx,
    Transaction, ADD_DELEGATOR_TX_TAG, ADD_VALIDATOR_TX_TAG, BASE_TX_TAG, EXPORT_TX_TAG,
    IMPORT_TX_TAG,
};
use crate::Result;

/// The current wire version
pub const CODEC_VERSION: u16 = 0;

/// Registries for one wire version.
pub struct Codec {
    /// Output kinds
    pub outputs: Registry<Output, Codec>,
    /// Input kinds
    pub inputs: Registry<Input, Codec>,
    /// Transaction kinds
    pub transactions: Registry<Transaction, Codec>,
}

impl Codec {
    /// Build the version-0 registries
    pub fn v0() -> Result<Self> {
        let outputs = Registry::builder()
            .slot(OUTPUT_OWNERS_TAG, read_output_owners) // 0
            .slot(TRANSFER_OUTPUT_TAG, read_transfer_output) // 1
            .skip() // 2: transfer input
            .slot(STAKEABLE_LOCK_OUT_TAG, read_stakeable_lock_out) // 3
            .build()?;

        let inputs = Registry::builder()
            .skip() // 0: output owners
            .skip() // 1: transfer output
            .slot(TRANSFER_INPUT_TAG, read_transfer_input) // 2
            .skip() // 3: stakeable lock output
            .slot(STAKEABLE_LOCK_IN_TAG, read_stakeable_lock_in) // 4
            .build()?;

        let transactions = Registry::builder()
            .skip() // 0
            .skip() // 1
            .skip() // 2
            .skip() // 3
            .skip() // 4
            .slot(BASE_TX_TAG, read_base_tx) // 5
            .slot(IMPORT_TX_TAG, read_import_tx) // 6
            .slot(EXPORT_TX_TAG, read_export_tx) // 7
            .slot(ADD_VALIDATOR_TX_TAG, read_add_validator_tx) // 8
            .slot(ADD_DELEGATOR_TX_TAG, read_add_delegator_tx) // 9
            .build()?;

        Ok(Self {
            outputs,
            inputs,
            transactions,
        })
    }
}

/// Build a manager with every known wire version registered
pub fn default_manager() -> Result<Manager<Codec>> {
    let mut manager = Manager::new();
    manager.register(CODEC_VERSION, Codec::v0()?)?;
    Ok(manager)
}

/// Encode a transaction as `[2-byte version][4-byte type id][fields…]`
pub fn pack_transaction(
    manager: &Manager<Codec>,
    version: u16,
    tx: &Transaction,
) -> Result<Vec<u8>> {
    Ok(manager.pack(version, |ctx, w| ctx.transactions.pack_prefix(w, tx, ctx))?)
}

/// Decode a transaction whose concrete kind is only known from the bytes.
///
/// Requires the whole buffer to be consumed; returns the wire version
/// alongside the transaction.
pub fn unpack_transaction(manager: &Manager<Codec>, bytes: &[u8]) -> Result<(u16, Transaction)> {
    Ok(manager.unpack_all(bytes, |ctx, r| ctx.transactions.unpack_prefix(r, ctx))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{Address, AssetId, BlockchainId, NodeId, TxId, UtxoId};
    use crate::inputs::{TransferInput, TransferableInput};
    use crate::outputs::{OutputOwners, TransferOutput, TransferableOutput};
    use crate::txs::{AddValidatorTx, BaseTxFields, ExportTx, ImportTx, Validator};
    use crate::Error;
    use serac_codec::CodecError;

    fn owners(addr_byte: u8) -> OutputOwners {
        OutputOwners::new(0, 1, vec![Address([addr_byte; 20])])
    }

    fn sample_base(memo: &[u8]) -> BaseTxFields {
        BaseTxFields {
            network_id: 1,
            blockchain_id: BlockchainId([0xcc; 32]),
            outputs: vec![TransferableOutput::new(
                AssetId([1u8; 32]),
                crate::Output::Transfer(TransferOutput::new(90, owners(2))),
            )],
            inputs: vec![TransferableInput::new(
                UtxoId::new(TxId([3u8; 32]), 0),
                AssetId([1u8; 32]),
                crate::Input::Transfer(TransferInput::new(100, vec![0])),
                vec![Address([5u8; 20])],
            )],
            memo: memo.to_vec(),
        }
    }

    #[test]
    fn test_base_tx_round_trip() {
        let manager = default_manager().unwrap();
        let tx = Transaction::Base(sample_base(b"hello"));

        let bytes = pack_transaction(&manager, CODEC_VERSION, &tx).unwrap();
        // version 0, then type id 5 for the base tx.
        assert_eq!(&bytes[..6], &[0, 0, 0, 0, 0, 5]);

        let (version, decoded) = unpack_transaction(&manager, &bytes).unwrap();
        assert_eq!(version, CODEC_VERSION);

        // Signer annotations are off-wire; compare with them stripped.
        let mut expected = sample_base(b"hello");
        expected.inputs[0].signers.clear();
        assert_eq!(decoded, Transaction::Base(expected));
    }

    #[test]
    fn test_import_export_round_trip() {
        let manager = default_manager().unwrap();

        let import = Transaction::Import(ImportTx {
            base: BaseTxFields {
                inputs: vec![],
                ..sample_base(b"")
            },
            source_chain: BlockchainId([0xaa; 32]),
            imported_inputs: vec![TransferableInput::new(
                UtxoId::new(TxId([8u8; 32]), 1),
                AssetId([1u8; 32]),
                crate::Input::Transfer(TransferInput::new(10, vec![0])),
                vec![],
            )],
        });
        let bytes = pack_transaction(&manager, CODEC_VERSION, &import).unwrap();
        let (_, decoded) = unpack_transaction(&manager, &bytes).unwrap();
        assert_eq!(decoded, import);

        let export = Transaction::Export(ExportTx {
            base: BaseTxFields {
                outputs: vec![],
                inputs: vec![],
                ..sample_base(b"")
            },
            destination_chain: BlockchainId([0xbb; 32]),
            exported_outputs: vec![TransferableOutput::new(
                AssetId([1u8; 32]),
                crate::Output::Transfer(TransferOutput::new(4, owners(9))),
            )],
        });
        let bytes = pack_transaction(&manager, CODEC_VERSION, &export).unwrap();
        let (_, decoded) = unpack_transaction(&manager, &bytes).unwrap();
        assert_eq!(decoded, export);
    }

    #[test]
    fn test_add_validator_round_trip() {
        let manager = default_manager().unwrap();
        let tx = Transaction::AddValidator(AddValidatorTx {
            base: BaseTxFields {
                outputs: vec![],
                inputs: vec![],
                ..sample_base(b"")
            },
            validator: Validator {
                node_id: NodeId([0xee; 20]),
                start_time: 1_000,
                end_time: 2_000,
                weight: 2_000_000_000_000,
            },
            stake: vec![TransferableOutput::new(
                AssetId([1u8; 32]),
                crate::Output::Transfer(TransferOutput::new(2_000_000_000_000, owners(2))),
            )],
            rewards_owner: owners(2),
            delegation_shares: 20_000,
        });

        let bytes = pack_transaction(&manager, CODEC_VERSION, &tx).unwrap();
        let (_, decoded) = unpack_transaction(&manager, &bytes).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_unknown_tx_type_id_fails() {
        let manager = default_manager().unwrap();
        // version 0, type id 2 (an input id, a hole in the tx registry).
        let bytes = [0u8, 0, 0, 0, 0, 2];
        let result = unpack_transaction(&manager, &bytes);
        assert!(matches!(
            result,
            Err(Error::Codec(CodecError::UnknownTypeId { id: 2 }))
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let manager = default_manager().unwrap();
        let tx = Transaction::Base(sample_base(b""));
        let mut bytes = pack_transaction(&manager, CODEC_VERSION, &tx).unwrap();
        bytes.push(0);

        let result = unpack_transaction(&manager, &bytes);
        assert!(matches!(
            result,
            Err(Error::Codec(CodecError::TrailingBytes { remaining: 1 }))
        ));
    }

    #[test]
    fn test_wire_ids_share_one_numbering_space() {
        let codec = Codec::v0().unwrap();
        assert_eq!(codec.outputs.wire_id(OUTPUT_OWNERS_TAG), Some(0));
        assert_eq!(codec.outputs.wire_id(TRANSFER_OUTPUT_TAG), Some(1));
        assert_eq!(codec.inputs.wire_id(TRANSFER_INPUT_TAG), Some(2));
        assert_eq!(codec.outputs.wire_id(STAKEABLE_LOCK_OUT_TAG), Some(3));
        assert_eq!(codec.inputs.wire_id(STAKEABLE_LOCK_IN_TAG), Some(4));
        assert_eq!(codec.transactions.wire_id(BASE_TX_TAG), Some(5));
    }
}
