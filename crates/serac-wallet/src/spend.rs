//! Coin selection
//!
//! Walks a caller-supplied UTXO collection in its given order and assembles
//! the inputs, spend outputs, and change outputs satisfying multi-asset
//! amount, fee, and time-lock constraints. Pure computation: no I/O, no
//! retries, no shared state. Re-invoking with the same UTXO order and the
//! same request yields a byte-identical result.

use crate::ids::{Address, AssetId};
use crate::inputs::{Input, StakeableLockIn, TransferInput, TransferableInput};
use crate::outputs::{Output, OutputOwners, StakeableLockOut, TransferOutput, TransferableOutput};
use crate::utxo::Utxo;
use crate::{Error, Result};

/// Per-asset bookkeeping while selecting.
///
/// `target` goes to the destination, `fee` is burned. Locked sources may
/// only cover the target, never the fee, so at completion
/// `spent_unlocked >= fee` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAmount {
    /// Asset being spent
    pub asset_id: AssetId,
    /// Amount to deliver to the destination
    pub target: u64,
    /// Fee portion to absorb from this asset
    pub fee: u64,
    /// Amount credited so far from unlocked sources
    pub spent_unlocked: u64,
    /// Amount credited so far from stakeable-locked sources
    pub spent_locked: u64,
}

impl AssetAmount {
    fn new(asset_id: AssetId, target: u64, fee: u64) -> Result<Self> {
        target
            .checked_add(fee)
            .ok_or_else(|| Error::AmountOverflow(format!("target {target} + fee {fee}")))?;
        Ok(Self {
            asset_id,
            target,
            fee,
            spent_unlocked: 0,
            spent_locked: 0,
        })
    }

    /// Total amount this asset must cover
    pub fn required(&self) -> u64 {
        self.target + self.fee
    }

    /// Amount credited so far, from both source kinds
    pub fn amount_spent(&self) -> u64 {
        self.spent_unlocked + self.spent_locked
    }

    /// Whether the requested amount plus fee is fully covered
    pub fn is_finished(&self) -> bool {
        self.amount_spent() == self.required()
    }

    /// Credit up to `available` from an unlocked source; returns the amount
    /// actually credited
    fn credit_unlocked(&mut self, available: u64) -> u64 {
        let credited = available.min(self.required() - self.amount_spent());
        self.spent_unlocked += credited;
        credited
    }

    /// Credit up to `available` from a locked source. Locked value only
    /// counts toward the target, so the credit is additionally capped at
    /// the uncovered target portion.
    fn credit_locked(&mut self, available: u64) -> u64 {
        let credited = available
            .min(self.required() - self.amount_spent())
            .min(self.target - self.spent_locked);
        self.spent_locked += credited;
        credited
    }
}

/// One transaction's worth of spend intent: who pays, who receives, where
/// change returns, and how much of which assets.
#[derive(Debug, Clone)]
pub struct SpendPlan {
    senders: Vec<Address>,
    destinations: Vec<Address>,
    change_addresses: Vec<Address>,
    threshold: u32,
    amounts: Vec<AssetAmount>,
}

impl SpendPlan {
    /// Create a plan with a destination threshold of 1
    pub fn new(
        senders: Vec<Address>,
        destinations: Vec<Address>,
        change_addresses: Vec<Address>,
    ) -> Self {
        Self {
            senders,
            destinations,
            change_addresses,
            threshold: 1,
            amounts: Vec::new(),
        }
    }

    /// Require `threshold` destination signatures to spend the outputs
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Request `target` of `asset_id` for the destination plus `fee` burned.
    ///
    /// Requesting the same asset again accumulates into the existing record.
    pub fn add_amount(&mut self, asset_id: AssetId, target: u64, fee: u64) -> Result<&mut Self> {
        if let Some(existing) = self.amounts.iter_mut().find(|a| a.asset_id == asset_id) {
            let target = existing.target.checked_add(target);
            let fee = existing.fee.checked_add(fee);
            match (target, fee) {
                (Some(target), Some(fee)) => {
                    *existing = AssetAmount::new(asset_id, target, fee)?;
                }
                _ => {
                    return Err(Error::AmountOverflow(format!(
                        "accumulated amount for asset {asset_id}"
                    )))
                }
            }
        } else {
            self.amounts.push(AssetAmount::new(asset_id, target, fee)?);
        }
        Ok(self)
    }

    /// The requested per-asset amounts, in request order
    pub fn amounts(&self) -> &[AssetAmount] {
        &self.amounts
    }

    /// Sender addresses that must satisfy each consumed output's ownership
    /// predicate
    pub fn senders(&self) -> &[Address] {
        &self.senders
    }
}

/// Result of a successful selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendOutcome {
    /// Inputs consuming the selected UTXOs, in consumption order
    pub inputs: Vec<TransferableInput>,
    /// Outputs delivering the requested amounts to the destination
    pub spend_outputs: Vec<TransferableOutput>,
    /// Outputs returning surplus value to the spender
    pub change_outputs: Vec<TransferableOutput>,
}

struct AssetState {
    amount: AssetAmount,
    change_unlocked: u64,
    change_locked: u64,
    // Lock terms of the most recently consumed locked UTXO; only that UTXO
    // can carry a locked-change remainder, by construction order.
    last_lock: Option<(u64, OutputOwners)>,
}

/// Select UTXOs to satisfy `plan`.
///
/// UTXOs are visited in their given order; the pass stops once every
/// requested [`AssetAmount`] is finished. Stakeable-locked UTXOs with an
/// unexpired lock are skipped unless `allow_stakeable` is set. On any
/// failure no partial result escapes.
pub fn spend(
    utxos: &[Utxo],
    plan: &SpendPlan,
    as_of: u64,
    allow_stakeable: bool,
) -> Result<SpendOutcome> {
    if plan.threshold as usize > plan.destinations.len() {
        return Err(Error::InvalidThreshold {
            threshold: plan.threshold,
            addresses: plan.destinations.len(),
        });
    }
    if plan.amounts.iter().all(|a| a.required() == 0) {
        return Err(Error::NothingToSpend);
    }

    let mut states: Vec<AssetState> = plan
        .amounts
        .iter()
        .map(|amount| AssetState {
            amount: amount.clone(),
            change_unlocked: 0,
            change_locked: 0,
            last_lock: None,
        })
        .collect();

    let mut inputs: Vec<TransferableInput> = Vec::new();

    for utxo in utxos {
        if states.iter().all(|s| s.amount.is_finished()) {
            break;
        }
        let Some(state) = states.iter_mut().find(|s| s.amount.asset_id == utxo.asset_id) else {
            continue;
        };
        if state.amount.is_finished() {
            continue;
        }

        let locked = utxo.output.is_stakeable_locked(as_of);
        if locked && !allow_stakeable {
            continue;
        }
        // Assets may mix amount-bearing and ownership-only output kinds;
        // the latter are silently skipped.
        let Some(amount) = utxo.output.amount() else {
            continue;
        };
        // Zero-amount outputs can arrive in decoded, unverified UTXO bytes;
        // consuming one would add a dead input.
        if amount == 0 {
            continue;
        }
        let Some(spenders) = utxo.output.spenders(&plan.senders, as_of) else {
            continue;
        };

        let signer_indices: Vec<u32> = spenders.iter().map(|(index, _)| *index).collect();
        let signers: Vec<Address> = spenders.iter().map(|(_, address)| *address).collect();

        let input = if let Output::StakeableLock(out) = &utxo.output {
            if locked {
                let credited = state.amount.credit_locked(amount);
                if credited == 0 {
                    // Locked value cannot cover the remaining fee portion.
                    continue;
                }
                state.change_locked += amount - credited;
                state.last_lock = Some((out.locktime, out.output.owners.clone()));
                Input::StakeableLock(StakeableLockIn::new(
                    out.locktime,
                    TransferInput::new(amount, signer_indices),
                ))
            } else {
                // Expired lock: the wrapper is inert, spend it plainly.
                let credited = state.amount.credit_unlocked(amount);
                state.change_unlocked += amount - credited;
                Input::Transfer(TransferInput::new(amount, signer_indices))
            }
        } else {
            let credited = state.amount.credit_unlocked(amount);
            state.change_unlocked += amount - credited;
            Input::Transfer(TransferInput::new(amount, signer_indices))
        };

        tracing::debug!(
            asset = %utxo.asset_id,
            amount,
            locked,
            spent = state.amount.amount_spent(),
            required = state.amount.required(),
            "consumed utxo"
        );

        inputs.push(TransferableInput::new(
            utxo.utxo_id,
            utxo.asset_id,
            input,
            signers,
        ));
    }

    for state in &states {
        if !state.amount.is_finished() {
            return Err(Error::InsufficientFunds {
                asset_id: state.amount.asset_id,
                needed: state.amount.required(),
                available: state.amount.amount_spent(),
            });
        }
    }

    let mut spend_outputs: Vec<TransferableOutput> = Vec::new();
    let mut change_outputs: Vec<TransferableOutput> = Vec::new();

    for state in &states {
        let asset_id = state.amount.asset_id;

        // Locked remainder: split the last consumed locked UTXO's value into
        // a change piece under the original lock terms and a spend piece to
        // the destination.
        if let Some((locktime, original_owners)) = &state.last_lock {
            if state.change_locked > 0 {
                let out = TransferOutput::new(state.change_locked, original_owners.clone());
                out.verify()?;
                change_outputs.push(TransferableOutput::new(
                    asset_id,
                    Output::StakeableLock(StakeableLockOut::new(*locktime, out)),
                ));
            }
            if state.amount.spent_locked > 0 {
                let out = TransferOutput::new(
                    state.amount.spent_locked,
                    OutputOwners::new(0, plan.threshold, plan.destinations.clone()),
                );
                out.verify()?;
                spend_outputs.push(TransferableOutput::new(
                    asset_id,
                    Output::StakeableLock(StakeableLockOut::new(*locktime, out)),
                ));
            }
        }

        if state.change_unlocked > 0 {
            let out = TransferOutput::new(
                state.change_unlocked,
                OutputOwners::new(0, 1, plan.change_addresses.clone()),
            );
            out.verify()?;
            change_outputs.push(TransferableOutput::new(asset_id, Output::Transfer(out)));
        }

        let unlocked_spend = state.amount.target - state.amount.spent_locked;
        if unlocked_spend > 0 {
            let out = TransferOutput::new(
                unlocked_spend,
                OutputOwners::new(0, plan.threshold, plan.destinations.clone()),
            );
            out.verify()?;
            spend_outputs.push(TransferableOutput::new(asset_id, Output::Transfer(out)));
        }
    }

    tracing::info!(
        inputs = inputs.len(),
        spends = spend_outputs.len(),
        change = change_outputs.len(),
        "selection complete"
    );

    Ok(SpendOutcome {
        inputs,
        spend_outputs,
        change_outputs,
    })
}
