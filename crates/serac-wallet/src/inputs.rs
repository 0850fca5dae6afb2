//! Transaction inputs
//!
//! An input consumes a UTXO in full: it names the UTXO, restates its amount,
//! and lists the indices of the owner addresses whose signatures will
//! authorize the spend.
//!
//! # Wire format
//!
//! | Kind               | Fields                                            |
//! |--------------------|---------------------------------------------------|
//! | transfer input     | amount u64, signer index list                     |
//! | stakeable lock in  | locktime u64, nested `[type id][transfer input]`  |

use serac_codec::{read_list, write_list, CodecError, Reader, Tagged, Writer};

use crate::codec::Codec;
use crate::ids::{Address, AssetId, UtxoId};

pub(crate) const TRANSFER_INPUT_TAG: &str = "transfer_input";
pub(crate) const STAKEABLE_LOCK_IN_TAG: &str = "stakeable_lock_input";

/// A plain spend of an amount-bearing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInput {
    /// Full amount of the consumed output, in nano-units
    pub amount: u64,
    /// Indices into the output's owner addresses, in ascending order,
    /// identifying which owners sign
    pub signer_indices: Vec<u32>,
}

impl TransferInput {
    /// Create a transfer input
    pub fn new(amount: u64, signer_indices: Vec<u32>) -> Self {
        Self {
            amount,
            signer_indices,
        }
    }

    pub(crate) fn write_fields(&self, w: &mut Writer) {
        w.put_u64(self.amount);
        write_list(w, &self.signer_indices, |w, idx| w.put_u32(*idx));
    }

    pub(crate) fn read_fields(r: &mut Reader<'_>) -> serac_codec::Result<Self> {
        let amount = r.get_u64()?;
        let signer_indices = read_list(r, |r| r.get_u32())?;
        Ok(Self {
            amount,
            signer_indices,
        })
    }
}

/// A spend of a stakeable-locked output, valid only for staking while the
/// lock is in force.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeableLockIn {
    /// Lock expiry carried over from the consumed output
    pub locktime: u64,
    /// The wrapped plain input
    pub input: TransferInput,
}

impl StakeableLockIn {
    /// Wrap a transfer input with its stakeable lock expiry
    pub fn new(locktime: u64, input: TransferInput) -> Self {
        Self { locktime, input }
    }
}

/// Any input kind, dispatched on the wire by type id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Plain spend
    Transfer(TransferInput),
    /// Spend of a stakeable-locked output
    StakeableLock(StakeableLockIn),
}

impl Input {
    /// Full amount of the consumed output
    pub fn amount(&self) -> u64 {
        match self {
            Input::Transfer(input) => input.amount,
            Input::StakeableLock(input) => input.input.amount,
        }
    }

    /// Indices of the owner addresses that sign this input
    pub fn signer_indices(&self) -> &[u32] {
        match self {
            Input::Transfer(input) => &input.signer_indices,
            Input::StakeableLock(input) => &input.input.signer_indices,
        }
    }
}

impl Tagged<Codec> for Input {
    fn wire_tag(&self) -> &'static str {
        match self {
            Input::Transfer(_) => TRANSFER_INPUT_TAG,
            Input::StakeableLock(_) => STAKEABLE_LOCK_IN_TAG,
        }
    }

    fn write_fields(&self, w: &mut Writer, ctx: &Codec) -> serac_codec::Result<()> {
        match self {
            Input::Transfer(input) => input.write_fields(w),
            Input::StakeableLock(input) => {
                w.put_u64(input.locktime);
                let id = ctx
                    .inputs
                    .wire_id(TRANSFER_INPUT_TAG)
                    .ok_or(CodecError::UnregisteredType {
                        tag: TRANSFER_INPUT_TAG,
                    })?;
                w.put_u32(id);
                input.input.write_fields(w);
            }
        }
        Ok(())
    }
}

pub(crate) fn read_transfer_input(r: &mut Reader<'_>, _ctx: &Codec) -> serac_codec::Result<Input> {
    Ok(Input::Transfer(TransferInput::read_fields(r)?))
}

pub(crate) fn read_stakeable_lock_in(
    r: &mut Reader<'_>,
    ctx: &Codec,
) -> serac_codec::Result<Input> {
    let locktime = r.get_u64()?;
    let id = r.get_u32()?;
    if Some(id) != ctx.inputs.wire_id(TRANSFER_INPUT_TAG) {
        return Err(CodecError::UnknownTypeId { id });
    }
    let input = TransferInput::read_fields(r)?;
    Ok(Input::StakeableLock(StakeableLockIn { locktime, input }))
}

/// A (UTXO, asset, input) triple: the canonical on-wire unit appended to a
/// transaction body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableInput {
    /// The UTXO being consumed
    pub utxo_id: UtxoId,
    /// Asset the consumed output denominates
    pub asset_id: AssetId,
    /// The typed input
    pub input: Input,
    /// Addresses that authorize this input, aligned with the signer
    /// indices. Resolved during selection for the signing seam; not
    /// serialized.
    pub signers: Vec<Address>,
}

impl TransferableInput {
    /// Create a transferable input with its resolved signers
    pub fn new(utxo_id: UtxoId, asset_id: AssetId, input: Input, signers: Vec<Address>) -> Self {
        Self {
            utxo_id,
            asset_id,
            input,
            signers,
        }
    }

    pub(crate) fn write(&self, w: &mut Writer, ctx: &Codec) -> serac_codec::Result<()> {
        w.put_raw(&self.utxo_id.tx_id.0);
        w.put_u32(self.utxo_id.output_index);
        w.put_raw(&self.asset_id.0);
        ctx.inputs.pack_prefix(w, &self.input, ctx)
    }

    pub(crate) fn read(r: &mut Reader<'_>, ctx: &Codec) -> serac_codec::Result<Self> {
        let tx_id = crate::ids::TxId(r.get_fixed::<32>()?);
        let output_index = r.get_u32()?;
        let asset_id = AssetId(r.get_fixed::<32>()?);
        let input = ctx.inputs.unpack_prefix(r, ctx)?;
        Ok(Self {
            utxo_id: UtxoId::new(tx_id, output_index),
            asset_id,
            input,
            // Signers are an off-wire annotation; decoded inputs have none.
            signers: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_amount_and_indices() {
        let plain = Input::Transfer(TransferInput::new(10, vec![0, 2]));
        assert_eq!(plain.amount(), 10);
        assert_eq!(plain.signer_indices(), &[0, 2]);

        let locked = Input::StakeableLock(StakeableLockIn::new(99, TransferInput::new(7, vec![1])));
        assert_eq!(locked.amount(), 7);
        assert_eq!(locked.signer_indices(), &[1]);
    }
}
