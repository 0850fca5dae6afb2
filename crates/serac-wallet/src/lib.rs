//! Serac wallet engine
//!
//! This crate implements the client side of the Serac wire format: the
//! transaction/UTXO data model, the coin-selection engine that assembles
//! inputs and outputs under multi-asset amount, fee, and time-lock
//! constraints, and the builders that produce ready-to-sign transactions.
//!
//! Everything here is synchronous, pure computation. UTXO collections are
//! supplied by the caller (typically fetched from a node), and signed bytes
//! are handed back for the caller to submit.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod codec;
pub mod error;
pub mod ids;
pub mod inputs;
pub mod keychain;
pub mod outputs;
pub mod spend;
pub mod txs;
pub mod utxo;

pub use builder::TxBuilder;
pub use codec::{default_manager, pack_transaction, unpack_transaction, Codec, CODEC_VERSION};
pub use error::{Error, ErrorCategory, Result};
pub use ids::{Address, AssetId, BlockchainId, NodeId, TxId, UtxoId};
pub use inputs::{Input, StakeableLockIn, TransferInput, TransferableInput};
pub use keychain::{Credential, Keychain, SignedTransaction, Signer};
pub use outputs::{Output, OutputOwners, StakeableLockOut, TransferOutput, TransferableOutput};
pub use spend::{spend, AssetAmount, SpendOutcome, SpendPlan};
pub use txs::{AddDelegatorTx, AddValidatorTx, BaseTxFields, ExportTx, ImportTx, Transaction, Validator, MAX_MEMO_LEN};
pub use utxo::Utxo;
