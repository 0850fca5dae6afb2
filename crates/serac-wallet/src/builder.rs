//! Transaction builders
//!
//! [`TxBuilder`] turns a spend intent plus a UTXO snapshot into an unsigned
//! [`Transaction`]: it picks the fee asset, assembles a [`SpendPlan`], runs
//! coin selection, and lays the resulting inputs and outputs into the
//! transaction shape. Builders never perform I/O and never mutate anything
//! shared; a failed build returns no transaction.

use std::collections::BTreeMap;

use serac_params::Network;

use crate::ids::{Address, AssetId, BlockchainId, NodeId};
use crate::inputs::{Input, TransferInput, TransferableInput};
use crate::outputs::{Output, OutputOwners, TransferOutput, TransferableOutput};
use crate::spend::{spend, SpendPlan};
use crate::txs::{
    AddDelegatorTx, AddValidatorTx, BaseTxFields, ExportTx, ImportTx, Transaction, Validator,
    MAX_MEMO_LEN, SHARES_DENOMINATOR,
};
use crate::utxo::Utxo;
use crate::{Error, Result};

/// Builds unsigned transactions against one network and one chain.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    network: Network,
    native_asset: AssetId,
    blockchain_id: BlockchainId,
    fee_override: Option<u64>,
}

impl TxBuilder {
    /// Create a builder for the given network and chain
    pub fn new(network: Network, native_asset: AssetId, blockchain_id: BlockchainId) -> Self {
        Self {
            network,
            native_asset,
            blockchain_id,
            fee_override: None,
        }
    }

    /// Override the network's flat transaction fee
    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee_override = Some(fee);
        self
    }

    /// The flat fee this builder charges, in nano-units of the native asset
    pub fn fee(&self) -> u64 {
        self.fee_override.unwrap_or(self.network.base_tx_fee)
    }

    fn check_memo(memo: &[u8]) -> Result<()> {
        if memo.len() > MAX_MEMO_LEN {
            return Err(Error::MemoTooLarge {
                len: memo.len(),
                max: MAX_MEMO_LEN,
            });
        }
        Ok(())
    }

    /// Plan a spend of `amount` of `asset_id`, charging the fee in the
    /// native asset.
    fn plan_spend(
        &self,
        senders: Vec<Address>,
        destinations: Vec<Address>,
        change: Vec<Address>,
        asset_id: AssetId,
        amount: u64,
    ) -> Result<SpendPlan> {
        let mut plan = SpendPlan::new(senders, destinations, change);
        if asset_id == self.native_asset {
            plan.add_amount(asset_id, amount, self.fee())?;
        } else {
            plan.add_amount(asset_id, amount, 0)?;
            plan.add_amount(self.native_asset, 0, self.fee())?;
        }
        Ok(plan)
    }

    fn base_fields(
        &self,
        outputs: Vec<TransferableOutput>,
        inputs: Vec<TransferableInput>,
        memo: Vec<u8>,
    ) -> BaseTxFields {
        BaseTxFields {
            network_id: self.network.network_id,
            blockchain_id: self.blockchain_id,
            outputs,
            inputs,
            memo,
        }
    }

    /// Build a plain transfer of `amount` of `asset_id` to `destinations`
    pub fn base_tx(
        &self,
        utxos: &[Utxo],
        senders: Vec<Address>,
        destinations: Vec<Address>,
        change: Vec<Address>,
        asset_id: AssetId,
        amount: u64,
        memo: Vec<u8>,
        as_of: u64,
    ) -> Result<Transaction> {
        Self::check_memo(&memo)?;
        let plan = self.plan_spend(senders, destinations, change, asset_id, amount)?;
        let outcome = spend(utxos, &plan, as_of, false)?;

        let mut outputs = outcome.spend_outputs;
        outputs.extend(outcome.change_outputs);

        tracing::debug!(
            kind = "base",
            inputs = outcome.inputs.len(),
            outputs = outputs.len(),
            "built transaction"
        );
        Ok(Transaction::Base(self.base_fields(
            outputs,
            outcome.inputs,
            memo,
        )))
    }

    /// Build an export of `amount` of `asset_id` to `destination_chain`.
    ///
    /// The spend outputs land in the exported list; change stays in the
    /// body.
    pub fn export_tx(
        &self,
        utxos: &[Utxo],
        senders: Vec<Address>,
        destinations: Vec<Address>,
        change: Vec<Address>,
        destination_chain: BlockchainId,
        asset_id: AssetId,
        amount: u64,
        memo: Vec<u8>,
        as_of: u64,
    ) -> Result<Transaction> {
        Self::check_memo(&memo)?;
        if destination_chain.is_zero() {
            return Err(Error::MissingChain);
        }
        let plan = self.plan_spend(senders, destinations, change, asset_id, amount)?;
        let outcome = spend(utxos, &plan, as_of, false)?;

        tracing::debug!(
            kind = "export",
            inputs = outcome.inputs.len(),
            exported = outcome.spend_outputs.len(),
            "built transaction"
        );
        Ok(Transaction::Export(ExportTx {
            base: self.base_fields(outcome.change_outputs, outcome.inputs, memo),
            destination_chain,
            exported_outputs: outcome.spend_outputs,
        }))
    }

    /// Build an import consuming `imported_utxos` exported by
    /// `source_chain`.
    ///
    /// Imported value is consumed in full and delivered to `destinations`,
    /// with the fee absorbed from the imported native-asset value first.
    /// Any fee shortfall is covered by local selection over `utxos`.
    pub fn import_tx(
        &self,
        utxos: &[Utxo],
        imported_utxos: &[Utxo],
        senders: Vec<Address>,
        destinations: Vec<Address>,
        change: Vec<Address>,
        source_chain: BlockchainId,
        memo: Vec<u8>,
        as_of: u64,
    ) -> Result<Transaction> {
        Self::check_memo(&memo)?;
        if source_chain.is_zero() {
            return Err(Error::MissingChain);
        }

        let mut imported_inputs: Vec<TransferableInput> = Vec::new();
        let mut imported_totals: BTreeMap<AssetId, u64> = BTreeMap::new();

        for utxo in imported_utxos {
            if utxo.output.is_stakeable_locked(as_of) {
                continue;
            }
            let Some(amount) = utxo.output.amount() else {
                continue;
            };
            let Some(spenders) = utxo.output.spenders(&senders, as_of) else {
                continue;
            };
            let signer_indices: Vec<u32> = spenders.iter().map(|(index, _)| *index).collect();
            let signers: Vec<Address> = spenders.iter().map(|(_, address)| *address).collect();

            let total = imported_totals.entry(utxo.asset_id).or_insert(0);
            *total = total
                .checked_add(amount)
                .ok_or_else(|| Error::AmountOverflow(format!("imported {}", utxo.asset_id)))?;
            imported_inputs.push(TransferableInput::new(
                utxo.utxo_id,
                utxo.asset_id,
                Input::Transfer(TransferInput::new(amount, signer_indices)),
                signers,
            ));
        }
        if imported_inputs.is_empty() {
            return Err(Error::NothingToSpend);
        }

        // Absorb the fee from imported native value; fall back to local
        // selection for the remainder.
        let fee = self.fee();
        let imported_native = imported_totals.get(&self.native_asset).copied().unwrap_or(0);
        let absorbed = fee.min(imported_native);
        if let Some(total) = imported_totals.get_mut(&self.native_asset) {
            *total -= absorbed;
        }

        let (mut body_inputs, mut outputs) = (Vec::new(), Vec::new());
        if fee > absorbed {
            let mut plan = SpendPlan::new(senders, destinations.clone(), change);
            plan.add_amount(self.native_asset, 0, fee - absorbed)?;
            let outcome = spend(utxos, &plan, as_of, false)?;
            body_inputs = outcome.inputs;
            outputs = outcome.change_outputs;
        }

        for (asset_id, total) in imported_totals {
            if total == 0 {
                continue;
            }
            let out = TransferOutput::new(total, OutputOwners::new(0, 1, destinations.clone()));
            out.verify()?;
            outputs.push(TransferableOutput::new(asset_id, Output::Transfer(out)));
        }

        tracing::debug!(
            kind = "import",
            imported = imported_inputs.len(),
            local = body_inputs.len(),
            "built transaction"
        );
        Ok(Transaction::Import(ImportTx {
            base: self.base_fields(outputs, body_inputs, memo),
            source_chain,
            imported_inputs,
        }))
    }

    fn check_stake(
        &self,
        start_time: u64,
        end_time: u64,
        stake_amount: u64,
        minimum: u64,
    ) -> Result<()> {
        if start_time >= end_time {
            return Err(Error::InvalidStakePeriod {
                start: start_time,
                end: end_time,
            });
        }
        if stake_amount < minimum {
            return Err(Error::StakeAmountTooLow {
                amount: stake_amount,
                minimum,
            });
        }
        Ok(())
    }

    /// Select the native-asset stake plus fee. Stakeable-locked UTXOs are
    /// eligible; locked value flows into the stake outputs.
    fn plan_stake(
        &self,
        utxos: &[Utxo],
        senders: Vec<Address>,
        stake_owners: Vec<Address>,
        change: Vec<Address>,
        stake_amount: u64,
        as_of: u64,
    ) -> Result<crate::spend::SpendOutcome> {
        let mut plan = SpendPlan::new(senders, stake_owners, change);
        plan.add_amount(self.native_asset, stake_amount, self.fee())?;
        spend(utxos, &plan, as_of, true)
    }

    /// Build a validator registration staking `stake_amount` on `node_id`
    /// from `start_time` to `end_time`.
    ///
    /// `stake_owners` receive the stake back when the period ends;
    /// `reward_owners` receive the staking reward. `delegation_shares` is
    /// the fee taken from delegators, out of [`SHARES_DENOMINATOR`].
    #[allow(clippy::too_many_arguments)]
    pub fn add_validator_tx(
        &self,
        utxos: &[Utxo],
        senders: Vec<Address>,
        stake_owners: Vec<Address>,
        change: Vec<Address>,
        reward_owners: Vec<Address>,
        node_id: NodeId,
        start_time: u64,
        end_time: u64,
        stake_amount: u64,
        delegation_shares: u32,
        memo: Vec<u8>,
        as_of: u64,
    ) -> Result<Transaction> {
        Self::check_memo(&memo)?;
        self.check_stake(
            start_time,
            end_time,
            stake_amount,
            self.network.min_validator_stake,
        )?;
        if delegation_shares > SHARES_DENOMINATOR {
            return Err(Error::InvalidAmount(format!(
                "delegation shares {delegation_shares} exceed {SHARES_DENOMINATOR}"
            )));
        }
        let rewards_owner = OutputOwners::new(0, 1, reward_owners);
        rewards_owner.verify()?;

        let outcome = self.plan_stake(utxos, senders, stake_owners, change, stake_amount, as_of)?;
        tracing::debug!(
            kind = "add_validator",
            node = %node_id,
            stake = stake_amount,
            "built transaction"
        );
        Ok(Transaction::AddValidator(AddValidatorTx {
            base: self.base_fields(outcome.change_outputs, outcome.inputs, memo),
            validator: Validator {
                node_id,
                start_time,
                end_time,
                weight: stake_amount,
            },
            stake: outcome.spend_outputs,
            rewards_owner,
            delegation_shares,
        }))
    }

    /// Build a delegation of `stake_amount` to the validator on `node_id`
    #[allow(clippy::too_many_arguments)]
    pub fn add_delegator_tx(
        &self,
        utxos: &[Utxo],
        senders: Vec<Address>,
        stake_owners: Vec<Address>,
        change: Vec<Address>,
        reward_owners: Vec<Address>,
        node_id: NodeId,
        start_time: u64,
        end_time: u64,
        stake_amount: u64,
        memo: Vec<u8>,
        as_of: u64,
    ) -> Result<Transaction> {
        Self::check_memo(&memo)?;
        self.check_stake(
            start_time,
            end_time,
            stake_amount,
            self.network.min_delegator_stake,
        )?;
        let rewards_owner = OutputOwners::new(0, 1, reward_owners);
        rewards_owner.verify()?;

        let outcome = self.plan_stake(utxos, senders, stake_owners, change, stake_amount, as_of)?;
        tracing::debug!(
            kind = "add_delegator",
            node = %node_id,
            stake = stake_amount,
            "built transaction"
        );
        Ok(Transaction::AddDelegator(AddDelegatorTx {
            base: self.base_fields(outcome.change_outputs, outcome.inputs, memo),
            validator: Validator {
                node_id,
                start_time,
                end_time,
                weight: stake_amount,
            },
            stake: outcome.spend_outputs,
            rewards_owner,
        }))
    }
}
