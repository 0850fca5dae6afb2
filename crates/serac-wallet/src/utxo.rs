//! Unspent transaction outputs
//!
//! A UTXO is created when a transaction executes on-chain (here: supplied by
//! the caller or a node), logically consumed when selected as an input, and
//! never mutated.
//!
//! # Wire format
//!
//! | Field         | Size                      |
//! |---------------|---------------------------|
//! | codec version | 2 bytes                   |
//! | tx id         | 32 bytes                  |
//! | output index  | 4 bytes                   |
//! | asset id      | 32 bytes                  |
//! | output        | 4-byte type id + payload  |

use serac_codec::{Manager, Reader, Writer};

use crate::codec::Codec;
use crate::ids::{AssetId, TxId, UtxoId};
use crate::outputs::Output;
use crate::Result;

/// A spendable value record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    /// Identity: creating transaction and output index
    pub utxo_id: UtxoId,
    /// Asset the output denominates
    pub asset_id: AssetId,
    /// The typed output payload
    pub output: Output,
}

impl Utxo {
    /// Create a UTXO from native values
    pub fn new(utxo_id: UtxoId, asset_id: AssetId, output: Output) -> Self {
        Self {
            utxo_id,
            asset_id,
            output,
        }
    }

    pub(crate) fn write_fields(&self, w: &mut Writer, ctx: &Codec) -> serac_codec::Result<()> {
        w.put_raw(&self.utxo_id.tx_id.0);
        w.put_u32(self.utxo_id.output_index);
        w.put_raw(&self.asset_id.0);
        ctx.outputs.pack_prefix(w, &self.output, ctx)
    }

    pub(crate) fn read_fields(r: &mut Reader<'_>, ctx: &Codec) -> serac_codec::Result<Self> {
        let tx_id = TxId(r.get_fixed::<32>()?);
        let output_index = r.get_u32()?;
        let asset_id = AssetId(r.get_fixed::<32>()?);
        let output = ctx.outputs.unpack_prefix(r, ctx)?;
        Ok(Self {
            utxo_id: UtxoId::new(tx_id, output_index),
            asset_id,
            output,
        })
    }

    /// Encode with the leading 2-byte codec version
    pub fn to_bytes(&self, manager: &Manager<Codec>, version: u16) -> Result<Vec<u8>> {
        Ok(manager.pack(version, |ctx, w| self.write_fields(w, ctx))?)
    }

    /// Decode from versioned bytes, requiring full consumption
    pub fn from_bytes(manager: &Manager<Codec>, bytes: &[u8]) -> Result<Self> {
        let (_, utxo) = manager.unpack_all(bytes, |ctx, r| Self::read_fields(r, ctx))?;
        Ok(utxo)
    }
}
