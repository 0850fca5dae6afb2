//! Transaction outputs
//!
//! An output either carries an amount (transferable, optionally wrapped in a
//! stakeable time-lock) or only ownership terms. Outputs are immutable value
//! objects: change is represented by building new outputs, never by
//! mutating existing ones.
//!
//! # Wire format
//!
//! Outputs appear on the wire behind a 4-byte type id assigned by the codec
//! registry; the fields below are the per-kind payloads.
//!
//! | Kind               | Fields                                             |
//! |--------------------|----------------------------------------------------|
//! | output owners      | locktime u64, threshold u32, address list          |
//! | transfer output    | amount u64, then the owner fields                  |
//! | stakeable lock out | locktime u64, nested `[type id][transfer output]`  |

use serac_codec::{read_list, write_list, CodecError, Reader, Tagged, Writer};

use crate::codec::Codec;
use crate::ids::{Address, AssetId};
use crate::{Error, Result};

pub(crate) const OUTPUT_OWNERS_TAG: &str = "output_owners";
pub(crate) const TRANSFER_OUTPUT_TAG: &str = "transfer_output";
pub(crate) const STAKEABLE_LOCK_OUT_TAG: &str = "stakeable_lock_output";

/// Ownership terms: who may spend, how many must sign, and from when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOwners {
    /// Unix time before which the owners may not spend
    pub locktime: u64,
    /// Minimum number of owner signatures required
    pub threshold: u32,
    /// Addresses that may sign, in canonical (sorted, unique) order
    pub addresses: Vec<Address>,
}

impl OutputOwners {
    /// Ownership terms spendable immediately by `threshold` of `addresses`
    pub fn new(locktime: u64, threshold: u32, mut addresses: Vec<Address>) -> Self {
        addresses.sort();
        addresses.dedup();
        Self {
            locktime,
            threshold,
            addresses,
        }
    }

    /// Check structural validity: the threshold must be satisfiable
    pub fn verify(&self) -> Result<()> {
        if self.threshold as usize > self.addresses.len() {
            return Err(Error::InvalidThreshold {
                threshold: self.threshold,
                addresses: self.addresses.len(),
            });
        }
        Ok(())
    }

    /// Resolve which of `senders` authorize a spend as of `as_of`.
    ///
    /// Returns the first `threshold` matching (owner index, address) pairs,
    /// or `None` when the locktime has not passed or too few senders match.
    pub fn spenders(&self, senders: &[Address], as_of: u64) -> Option<Vec<(u32, Address)>> {
        if self.locktime > as_of {
            return None;
        }
        let mut found = Vec::with_capacity(self.threshold as usize);
        for (index, address) in self.addresses.iter().enumerate() {
            if found.len() == self.threshold as usize {
                break;
            }
            if senders.contains(address) {
                found.push((index as u32, *address));
            }
        }
        (found.len() == self.threshold as usize).then_some(found)
    }

    pub(crate) fn write_fields(&self, w: &mut Writer) {
        w.put_u64(self.locktime);
        w.put_u32(self.threshold);
        write_list(w, &self.addresses, |w, addr| w.put_raw(&addr.0));
    }

    pub(crate) fn read_fields(r: &mut Reader<'_>) -> serac_codec::Result<Self> {
        let locktime = r.get_u64()?;
        let threshold = r.get_u32()?;
        let addresses = read_list(r, |r| Ok(Address(r.get_fixed::<20>()?)))?;
        Ok(Self {
            locktime,
            threshold,
            addresses,
        })
    }
}

/// An amount-bearing output locked to ownership terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutput {
    /// Amount carried by the output, in nano-units
    pub amount: u64,
    /// Who may spend it
    pub owners: OutputOwners,
}

impl TransferOutput {
    /// Create a transfer output
    pub fn new(amount: u64, owners: OutputOwners) -> Self {
        Self { amount, owners }
    }

    /// Check structural validity
    pub fn verify(&self) -> Result<()> {
        if self.amount == 0 {
            return Err(Error::InvalidAmount(
                "output amount cannot be zero".to_string(),
            ));
        }
        self.owners.verify()
    }

    pub(crate) fn write_fields(&self, w: &mut Writer) {
        w.put_u64(self.amount);
        self.owners.write_fields(w);
    }

    pub(crate) fn read_fields(r: &mut Reader<'_>) -> serac_codec::Result<Self> {
        let amount = r.get_u64()?;
        let owners = OutputOwners::read_fields(r)?;
        Ok(Self { amount, owners })
    }
}

/// A transfer output under a stakeable time-lock.
///
/// Until `locktime` the value may be used for staking but not for ordinary
/// transfer. After `locktime` the wrapper is inert and the inner output
/// behaves like a plain transfer output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeableLockOut {
    /// Unix time at which the stakeable lock expires
    pub locktime: u64,
    /// The wrapped amount-bearing output
    pub output: TransferOutput,
}

impl StakeableLockOut {
    /// Wrap a transfer output in a stakeable lock
    pub fn new(locktime: u64, output: TransferOutput) -> Self {
        Self { locktime, output }
    }

    /// Effective locktime: the later of the wrapper and the owner locktime
    pub fn effective_locktime(&self) -> u64 {
        self.locktime.max(self.output.owners.locktime)
    }
}

/// Any output kind, dispatched on the wire by type id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Ownership-only output (no amount)
    Owners(OutputOwners),
    /// Amount-bearing transfer output
    Transfer(TransferOutput),
    /// Transfer output under a stakeable time-lock
    StakeableLock(StakeableLockOut),
}

impl Output {
    /// The amount carried, if this output kind carries one
    pub fn amount(&self) -> Option<u64> {
        match self {
            Output::Owners(_) => None,
            Output::Transfer(out) => Some(out.amount),
            Output::StakeableLock(out) => Some(out.output.amount),
        }
    }

    /// The ownership terms governing the output
    pub fn owners(&self) -> &OutputOwners {
        match self {
            Output::Owners(owners) => owners,
            Output::Transfer(out) => &out.owners,
            Output::StakeableLock(out) => &out.output.owners,
        }
    }

    /// Whether a stakeable lock is still in force at `as_of`
    pub fn is_stakeable_locked(&self, as_of: u64) -> bool {
        match self {
            Output::StakeableLock(out) => out.locktime > as_of,
            Output::Owners(_) | Output::Transfer(_) => false,
        }
    }

    /// Resolve the sender addresses that authorize spending this output as
    /// of `as_of`; see [`OutputOwners::spenders`]
    pub fn spenders(&self, senders: &[Address], as_of: u64) -> Option<Vec<(u32, Address)>> {
        self.owners().spenders(senders, as_of)
    }
}

impl Tagged<Codec> for Output {
    fn wire_tag(&self) -> &'static str {
        match self {
            Output::Owners(_) => OUTPUT_OWNERS_TAG,
            Output::Transfer(_) => TRANSFER_OUTPUT_TAG,
            Output::StakeableLock(_) => STAKEABLE_LOCK_OUT_TAG,
        }
    }

    fn write_fields(&self, w: &mut Writer, ctx: &Codec) -> serac_codec::Result<()> {
        match self {
            Output::Owners(owners) => owners.write_fields(w),
            Output::Transfer(out) => out.write_fields(w),
            Output::StakeableLock(out) => {
                w.put_u64(out.locktime);
                // The wrapped output recurses through the registry so its
                // type id stays version-correct.
                let id = ctx
                    .outputs
                    .wire_id(TRANSFER_OUTPUT_TAG)
                    .ok_or(CodecError::UnregisteredType {
                        tag: TRANSFER_OUTPUT_TAG,
                    })?;
                w.put_u32(id);
                out.output.write_fields(w);
            }
        }
        Ok(())
    }
}

pub(crate) fn read_output_owners(r: &mut Reader<'_>, _ctx: &Codec) -> serac_codec::Result<Output> {
    Ok(Output::Owners(OutputOwners::read_fields(r)?))
}

pub(crate) fn read_transfer_output(r: &mut Reader<'_>, _ctx: &Codec) -> serac_codec::Result<Output> {
    Ok(Output::Transfer(TransferOutput::read_fields(r)?))
}

pub(crate) fn read_stakeable_lock_out(
    r: &mut Reader<'_>,
    ctx: &Codec,
) -> serac_codec::Result<Output> {
    let locktime = r.get_u64()?;
    let id = r.get_u32()?;
    // Only an amount-bearing output may sit under a stakeable lock.
    if Some(id) != ctx.outputs.wire_id(TRANSFER_OUTPUT_TAG) {
        return Err(CodecError::UnknownTypeId { id });
    }
    let output = TransferOutput::read_fields(r)?;
    Ok(Output::StakeableLock(StakeableLockOut { locktime, output }))
}

/// An (asset, output) pair: the canonical on-wire unit appended to a
/// transaction body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableOutput {
    /// Asset the output denominates
    pub asset_id: AssetId,
    /// The typed output
    pub output: Output,
}

impl TransferableOutput {
    /// Create a transferable output
    pub fn new(asset_id: AssetId, output: Output) -> Self {
        Self { asset_id, output }
    }

    pub(crate) fn write(&self, w: &mut Writer, ctx: &Codec) -> serac_codec::Result<()> {
        w.put_raw(&self.asset_id.0);
        ctx.outputs.pack_prefix(w, &self.output, ctx)
    }

    pub(crate) fn read(r: &mut Reader<'_>, ctx: &Codec) -> serac_codec::Result<Self> {
        let asset_id = AssetId(r.get_fixed::<32>()?);
        let output = ctx.outputs.unpack_prefix(r, ctx)?;
        Ok(Self { asset_id, output })
    }
}
