//! Transaction kinds and their wire layouts
//!
//! Every transaction leads with the common body (network id, blockchain id,
//! outputs, inputs, memo); the kind-specific fields follow. On the wire a
//! transaction is `[2-byte codec version][4-byte type id][fields…]`, with
//! nested polymorphic fields recursing through the codec registry.

use serac_codec::{CodecError, Reader, Tagged, Writer};

use crate::codec::Codec;
use crate::ids::{BlockchainId, NodeId};
use crate::inputs::TransferableInput;
use crate::outputs::{OutputOwners, TransferableOutput, OUTPUT_OWNERS_TAG};

pub(crate) const BASE_TX_TAG: &str = "base_tx";
pub(crate) const IMPORT_TX_TAG: &str = "import_tx";
pub(crate) const EXPORT_TX_TAG: &str = "export_tx";
pub(crate) const ADD_VALIDATOR_TX_TAG: &str = "add_validator_tx";
pub(crate) const ADD_DELEGATOR_TX_TAG: &str = "add_delegator_tx";

/// Maximum memo length in bytes
pub const MAX_MEMO_LEN: usize = 256;

/// Denominator for delegation fee shares (1_000_000 = 100%)
pub const SHARES_DENOMINATOR: u32 = 1_000_000;

fn write_outputs(
    w: &mut Writer,
    outputs: &[TransferableOutput],
    ctx: &Codec,
) -> serac_codec::Result<()> {
    w.put_u32(outputs.len() as u32);
    for output in outputs {
        output.write(w, ctx)?;
    }
    Ok(())
}

fn read_outputs(r: &mut Reader<'_>, ctx: &Codec) -> serac_codec::Result<Vec<TransferableOutput>> {
    let count = r.get_u32()? as usize;
    let mut out = Vec::with_capacity(count.min(r.remaining_len()));
    for _ in 0..count {
        out.push(TransferableOutput::read(r, ctx)?);
    }
    Ok(out)
}

fn write_inputs(
    w: &mut Writer,
    inputs: &[TransferableInput],
    ctx: &Codec,
) -> serac_codec::Result<()> {
    w.put_u32(inputs.len() as u32);
    for input in inputs {
        input.write(w, ctx)?;
    }
    Ok(())
}

fn read_inputs(r: &mut Reader<'_>, ctx: &Codec) -> serac_codec::Result<Vec<TransferableInput>> {
    let count = r.get_u32()? as usize;
    let mut out = Vec::with_capacity(count.min(r.remaining_len()));
    for _ in 0..count {
        out.push(TransferableInput::read(r, ctx)?);
    }
    Ok(out)
}

/// The common body shared by every transaction kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTxFields {
    /// Network this transaction is valid on
    pub network_id: u32,
    /// Chain this transaction is valid on
    pub blockchain_id: BlockchainId,
    /// Outputs created by this transaction
    pub outputs: Vec<TransferableOutput>,
    /// UTXOs consumed by this transaction
    pub inputs: Vec<TransferableInput>,
    /// Arbitrary caller memo, capped at [`MAX_MEMO_LEN`] bytes
    pub memo: Vec<u8>,
}

impl BaseTxFields {
    pub(crate) fn write_fields(&self, w: &mut Writer, ctx: &Codec) -> serac_codec::Result<()> {
        w.put_u32(self.network_id);
        w.put_raw(&self.blockchain_id.0);
        write_outputs(w, &self.outputs, ctx)?;
        write_inputs(w, &self.inputs, ctx)?;
        w.put_byte_string(&self.memo);
        Ok(())
    }

    pub(crate) fn read_fields(r: &mut Reader<'_>, ctx: &Codec) -> serac_codec::Result<Self> {
        let network_id = r.get_u32()?;
        let blockchain_id = BlockchainId(r.get_fixed::<32>()?);
        let outputs = read_outputs(r, ctx)?;
        let inputs = read_inputs(r, ctx)?;
        let memo = r.get_byte_string()?;
        Ok(Self {
            network_id,
            blockchain_id,
            outputs,
            inputs,
            memo,
        })
    }
}

/// Consumes UTXOs exported from another chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTx {
    /// Common body
    pub base: BaseTxFields,
    /// Chain the imported inputs come from
    pub source_chain: BlockchainId,
    /// Inputs consuming the other chain's exported UTXOs
    pub imported_inputs: Vec<TransferableInput>,
}

/// Moves funds to another chain's shared memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTx {
    /// Common body
    pub base: BaseTxFields,
    /// Chain the exported outputs are destined for
    pub destination_chain: BlockchainId,
    /// Outputs being moved off-chain
    pub exported_outputs: Vec<TransferableOutput>,
}

/// Identity and period of a staker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    /// Node being staked on
    pub node_id: NodeId,
    /// Unix time staking begins
    pub start_time: u64,
    /// Unix time staking ends
    pub end_time: u64,
    /// Amount staked, in nano-units of the native asset
    pub weight: u64,
}

impl Validator {
    fn write_fields(&self, w: &mut Writer) {
        w.put_raw(&self.node_id.0);
        w.put_u64(self.start_time);
        w.put_u64(self.end_time);
        w.put_u64(self.weight);
    }

    fn read_fields(r: &mut Reader<'_>) -> serac_codec::Result<Self> {
        let node_id = NodeId(r.get_fixed::<20>()?);
        let start_time = r.get_u64()?;
        let end_time = r.get_u64()?;
        let weight = r.get_u64()?;
        Ok(Self {
            node_id,
            start_time,
            end_time,
            weight,
        })
    }
}

fn write_rewards_owner(
    w: &mut Writer,
    owners: &OutputOwners,
    ctx: &Codec,
) -> serac_codec::Result<()> {
    let id = ctx
        .outputs
        .wire_id(OUTPUT_OWNERS_TAG)
        .ok_or(CodecError::UnregisteredType {
            tag: OUTPUT_OWNERS_TAG,
        })?;
    w.put_u32(id);
    owners.write_fields(w);
    Ok(())
}

fn read_rewards_owner(r: &mut Reader<'_>, ctx: &Codec) -> serac_codec::Result<OutputOwners> {
    let id = r.get_u32()?;
    if Some(id) != ctx.outputs.wire_id(OUTPUT_OWNERS_TAG) {
        return Err(CodecError::UnknownTypeId { id });
    }
    OutputOwners::read_fields(r)
}

/// Registers a validator, locking its stake for the staking period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddValidatorTx {
    /// Common body (change outputs live here)
    pub base: BaseTxFields,
    /// Staker identity and period
    pub validator: Validator,
    /// Outputs locked for the staking period
    pub stake: Vec<TransferableOutput>,
    /// Who receives the staking reward
    pub rewards_owner: OutputOwners,
    /// Fee taken from delegators, out of [`SHARES_DENOMINATOR`]
    pub delegation_shares: u32,
}

/// Delegates stake to an existing validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDelegatorTx {
    /// Common body (change outputs live here)
    pub base: BaseTxFields,
    /// Delegation target and period
    pub validator: Validator,
    /// Outputs locked for the staking period
    pub stake: Vec<TransferableOutput>,
    /// Who receives the staking reward
    pub rewards_owner: OutputOwners,
}

/// Any transaction kind, dispatched on the wire by type id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Plain multi-asset transfer
    Base(BaseTxFields),
    /// Cross-chain import
    Import(ImportTx),
    /// Cross-chain export
    Export(ExportTx),
    /// Validator registration
    AddValidator(AddValidatorTx),
    /// Stake delegation
    AddDelegator(AddDelegatorTx),
}

impl Transaction {
    /// The common body of any transaction kind
    pub fn base(&self) -> &BaseTxFields {
        match self {
            Transaction::Base(base) => base,
            Transaction::Import(tx) => &tx.base,
            Transaction::Export(tx) => &tx.base,
            Transaction::AddValidator(tx) => &tx.base,
            Transaction::AddDelegator(tx) => &tx.base,
        }
    }

    /// Every input needing a credential, in signing order: body inputs
    /// first, then imported inputs
    pub fn all_inputs(&self) -> Vec<&TransferableInput> {
        let mut inputs: Vec<&TransferableInput> = self.base().inputs.iter().collect();
        if let Transaction::Import(tx) = self {
            inputs.extend(tx.imported_inputs.iter());
        }
        inputs
    }
}

impl Tagged<Codec> for Transaction {
    fn wire_tag(&self) -> &'static str {
        match self {
            Transaction::Base(_) => BASE_TX_TAG,
            Transaction::Import(_) => IMPORT_TX_TAG,
            Transaction::Export(_) => EXPORT_TX_TAG,
            Transaction::AddValidator(_) => ADD_VALIDATOR_TX_TAG,
            Transaction::AddDelegator(_) => ADD_DELEGATOR_TX_TAG,
        }
    }

    fn write_fields(&self, w: &mut Writer, ctx: &Codec) -> serac_codec::Result<()> {
        match self {
            Transaction::Base(base) => base.write_fields(w, ctx),
            Transaction::Import(tx) => {
                tx.base.write_fields(w, ctx)?;
                w.put_raw(&tx.source_chain.0);
                write_inputs(w, &tx.imported_inputs, ctx)
            }
            Transaction::Export(tx) => {
                tx.base.write_fields(w, ctx)?;
                w.put_raw(&tx.destination_chain.0);
                write_outputs(w, &tx.exported_outputs, ctx)
            }
            Transaction::AddValidator(tx) => {
                tx.base.write_fields(w, ctx)?;
                tx.validator.write_fields(w);
                write_outputs(w, &tx.stake, ctx)?;
                write_rewards_owner(w, &tx.rewards_owner, ctx)?;
                w.put_u32(tx.delegation_shares);
                Ok(())
            }
            Transaction::AddDelegator(tx) => {
                tx.base.write_fields(w, ctx)?;
                tx.validator.write_fields(w);
                write_outputs(w, &tx.stake, ctx)?;
                write_rewards_owner(w, &tx.rewards_owner, ctx)
            }
        }
    }
}

pub(crate) fn read_base_tx(r: &mut Reader<'_>, ctx: &Codec) -> serac_codec::Result<Transaction> {
    Ok(Transaction::Base(BaseTxFields::read_fields(r, ctx)?))
}

pub(crate) fn read_import_tx(r: &mut Reader<'_>, ctx: &Codec) -> serac_codec::Result<Transaction> {
    let base = BaseTxFields::read_fields(r, ctx)?;
    let source_chain = BlockchainId(r.get_fixed::<32>()?);
    let imported_inputs = read_inputs(r, ctx)?;
    Ok(Transaction::Import(ImportTx {
        base,
        source_chain,
        imported_inputs,
    }))
}

pub(crate) fn read_export_tx(r: &mut Reader<'_>, ctx: &Codec) -> serac_codec::Result<Transaction> {
    let base = BaseTxFields::read_fields(r, ctx)?;
    let destination_chain = BlockchainId(r.get_fixed::<32>()?);
    let exported_outputs = read_outputs(r, ctx)?;
    Ok(Transaction::Export(ExportTx {
        base,
        destination_chain,
        exported_outputs,
    }))
}

pub(crate) fn read_add_validator_tx(
    r: &mut Reader<'_>,
    ctx: &Codec,
) -> serac_codec::Result<Transaction> {
    let base = BaseTxFields::read_fields(r, ctx)?;
    let validator = Validator::read_fields(r)?;
    let stake = read_outputs(r, ctx)?;
    let rewards_owner = read_rewards_owner(r, ctx)?;
    let delegation_shares = r.get_u32()?;
    Ok(Transaction::AddValidator(AddValidatorTx {
        base,
        validator,
        stake,
        rewards_owner,
        delegation_shares,
    }))
}

pub(crate) fn read_add_delegator_tx(
    r: &mut Reader<'_>,
    ctx: &Codec,
) -> serac_codec::Result<Transaction> {
    let base = BaseTxFields::read_fields(r, ctx)?;
    let validator = Validator::read_fields(r)?;
    let stake = read_outputs(r, ctx)?;
    let rewards_owner = read_rewards_owner(r, ctx)?;
    Ok(Transaction::AddDelegator(AddDelegatorTx {
        base,
        validator,
        stake,
        rewards_owner,
    }))
}
