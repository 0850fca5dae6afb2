//! Property-based tests for serac-wallet
//!
//! Uses proptest to verify selection and wire-format invariants across
//! randomized inputs

use proptest::prelude::*;
use serac_params::Network;
use serac_wallet::{
    default_manager, pack_transaction, spend, unpack_transaction, Address, AssetId, BlockchainId,
    Error, Output, OutputOwners, SpendPlan, StakeableLockOut, Transaction, TransferOutput, TxBuilder,
    TxId, Utxo, UtxoId, CODEC_VERSION, MAX_MEMO_LEN,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

const SENDER: Address = Address([1u8; 20]);
const DEST: Address = Address([2u8; 20]);
const ASSET: AssetId = AssetId([0xaa; 32]);

/// Generate spendable amounts (1 nano-unit to 1e15)
fn amount_strategy() -> impl Strategy<Value = u64> {
    1u64..=1_000_000_000_000_000
}

/// Generate a set of UTXO amounts, each flagged locked or unlocked
fn utxo_set_strategy() -> impl Strategy<Value = Vec<(u64, bool)>> {
    prop::collection::vec((amount_strategy(), any::<bool>()), 1..12)
}

fn make_utxos(amounts: &[(u64, bool)]) -> Vec<Utxo> {
    amounts
        .iter()
        .enumerate()
        .map(|(i, (amount, locked))| {
            let inner = TransferOutput::new(*amount, OutputOwners::new(0, 1, vec![SENDER]));
            let output = if *locked {
                Output::StakeableLock(StakeableLockOut::new(u64::MAX, inner))
            } else {
                Output::Transfer(inner)
            };
            Utxo::new(
                UtxoId::new(TxId([i as u8; 32]), i as u32),
                ASSET,
                output,
            )
        })
        .collect()
}

fn plan(target: u64, fee: u64) -> SpendPlan {
    let mut plan = SpendPlan::new(vec![SENDER], vec![DEST], vec![SENDER]);
    plan.add_amount(ASSET, target, fee).unwrap();
    plan
}

fn output_total(outputs: &[serac_wallet::TransferableOutput]) -> u64 {
    outputs.iter().filter_map(|o| o.output.amount()).sum()
}

// ============================================================================
// Selection Properties
// ============================================================================

proptest! {
    /// Property: inputs == spend + change + fee, per asset
    #[test]
    fn prop_value_conservation(
        amounts in utxo_set_strategy(),
        target in amount_strategy(),
        fee in 0u64..1_000_000
    ) {
        let utxos = make_utxos(&amounts);
        let unlocked: u64 = amounts.iter().filter(|(_, l)| !l).map(|(a, _)| a).sum();
        prop_assume!(unlocked >= target.saturating_add(fee));

        let outcome = spend(&utxos, &plan(target, fee), 0, false).unwrap();

        let in_total: u64 = outcome.inputs.iter().map(|i| i.input.amount()).sum();
        let out_total = output_total(&outcome.spend_outputs) + output_total(&outcome.change_outputs);
        prop_assert_eq!(in_total, out_total + fee);
        prop_assert_eq!(output_total(&outcome.spend_outputs), target);
    }

    /// Property: same UTXO order + same request = identical outcome
    #[test]
    fn prop_selection_is_deterministic(
        amounts in utxo_set_strategy(),
        target in amount_strategy()
    ) {
        let utxos = make_utxos(&amounts);
        let request = plan(target, 0);

        let first = spend(&utxos, &request, 0, true);
        let second = spend(&utxos, &request, 0, true);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            other => prop_assert!(false, "runs diverged: {:?}", other),
        }
    }

    /// Property: requesting more than the total always fails, with no
    /// partial result
    #[test]
    fn prop_insufficient_funds_is_total(
        amounts in utxo_set_strategy(),
        excess in 1u64..1_000_000
    ) {
        let utxos = make_utxos(&amounts);
        let total: u64 = amounts.iter().map(|(a, _)| a).sum();
        prop_assume!(total < u64::MAX - excess);

        let result = spend(&utxos, &plan(total + excess, 0), 0, true);
        prop_assert!(
            matches!(result, Err(Error::InsufficientFunds { .. })),
            "expected InsufficientFunds, got {:?}",
            result
        );
    }

    /// Property: locked UTXOs are invisible without the opt-in flag
    #[test]
    fn prop_locked_requires_opt_in(
        amounts in utxo_set_strategy(),
        target in amount_strategy()
    ) {
        let locked: Vec<(u64, bool)> = amounts.iter().map(|(a, _)| (*a, true)).collect();
        let utxos = make_utxos(&locked);

        let result = spend(&utxos, &plan(target, 0), 0, false);
        prop_assert!(
            matches!(
                result,
                Err(Error::InsufficientFunds { available: 0, .. })
            ),
            "expected InsufficientFunds with available: 0, got {:?}",
            result
        );
    }

    /// Property: locked value never covers the fee; the unlocked side of
    /// the selection always absorbs it in full
    #[test]
    fn prop_locked_value_never_pays_fee(
        amounts in utxo_set_strategy(),
        target in amount_strategy(),
        fee in 1u64..1_000_000
    ) {
        let utxos = make_utxos(&amounts);
        let total: u64 = amounts.iter().map(|(a, _)| a).sum();
        let unlocked: u64 = amounts.iter().filter(|(_, l)| !l).map(|(a, _)| a).sum();
        prop_assume!(total >= target.saturating_add(fee));
        prop_assume!(unlocked >= fee);

        if let Ok(outcome) = spend(&utxos, &plan(target, fee), 0, true) {
            let locked_in: u64 = outcome
                .inputs
                .iter()
                .filter(|i| matches!(i.input, serac_wallet::Input::StakeableLock(_)))
                .map(|i| i.input.amount())
                .sum();
            let locked_out: u64 = outcome
                .spend_outputs
                .iter()
                .chain(outcome.change_outputs.iter())
                .filter(|o| matches!(o.output, Output::StakeableLock(_)))
                .filter_map(|o| o.output.amount())
                .sum();
            prop_assert_eq!(locked_in, locked_out);
        }
    }
}

// ============================================================================
// Wire Format Properties
// ============================================================================

proptest! {
    /// Property: any UTXO survives an encode/decode cycle
    #[test]
    fn prop_utxo_round_trip(
        amount in amount_strategy(),
        locktime in any::<u64>(),
        index in any::<u32>(),
        tx_byte in any::<u8>()
    ) {
        let manager = default_manager().unwrap();
        let utxo = Utxo::new(
            UtxoId::new(TxId([tx_byte; 32]), index),
            ASSET,
            Output::StakeableLock(StakeableLockOut::new(
                locktime,
                TransferOutput::new(amount, OutputOwners::new(0, 1, vec![SENDER])),
            )),
        );

        let bytes = utxo.to_bytes(&manager, CODEC_VERSION).unwrap();
        let decoded = Utxo::from_bytes(&manager, &bytes).unwrap();
        prop_assert_eq!(decoded, utxo);
    }

    /// Property: built transactions survive an encode/decode cycle modulo
    /// the off-wire signer annotations
    #[test]
    fn prop_built_tx_round_trip(
        amounts in utxo_set_strategy(),
        target in amount_strategy(),
        memo in prop::collection::vec(any::<u8>(), 0..MAX_MEMO_LEN)
    ) {
        let fee = 1_000;
        let unlocked: Vec<(u64, bool)> = amounts.iter().map(|(a, _)| (*a, false)).collect();
        let total: u64 = amounts.iter().map(|(a, _)| a).sum();
        prop_assume!(total >= target.saturating_add(fee));

        let utxos = make_utxos(&unlocked);
        let builder = TxBuilder::new(Network::local(), ASSET, BlockchainId([0xcc; 32]))
            .with_fee(fee);
        let tx = builder
            .base_tx(
                &utxos,
                vec![SENDER],
                vec![DEST],
                vec![SENDER],
                ASSET,
                target,
                memo,
                0,
            )
            .unwrap();

        let manager = default_manager().unwrap();
        let bytes = pack_transaction(&manager, CODEC_VERSION, &tx).unwrap();
        let (version, decoded) = unpack_transaction(&manager, &bytes).unwrap();
        prop_assert_eq!(version, CODEC_VERSION);

        let mut expected = tx.clone();
        if let Transaction::Base(base) = &mut expected {
            for input in &mut base.inputs {
                input.signers.clear();
            }
        }
        prop_assert_eq!(decoded, expected);
    }

    /// Property: packing the same transaction twice yields identical bytes
    #[test]
    fn prop_packing_is_deterministic(
        amounts in utxo_set_strategy(),
        target in amount_strategy()
    ) {
        let fee = 1_000;
        let unlocked: Vec<(u64, bool)> = amounts.iter().map(|(a, _)| (*a, false)).collect();
        let total: u64 = amounts.iter().map(|(a, _)| a).sum();
        prop_assume!(total >= target.saturating_add(fee));

        let utxos = make_utxos(&unlocked);
        let builder = TxBuilder::new(Network::local(), ASSET, BlockchainId([0xcc; 32]))
            .with_fee(fee);
        let build = || {
            builder
                .base_tx(
                    &utxos,
                    vec![SENDER],
                    vec![DEST],
                    vec![SENDER],
                    ASSET,
                    target,
                    vec![],
                    0,
                )
                .unwrap()
        };

        let manager = default_manager().unwrap();
        let a = pack_transaction(&manager, CODEC_VERSION, &build()).unwrap();
        let b = pack_transaction(&manager, CODEC_VERSION, &build()).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Property: the memo cap is enforced for every oversized length
    #[test]
    fn prop_memo_cap_enforced(extra in 1usize..512) {
        let utxos = make_utxos(&[(1_000_000, false)]);
        let builder = TxBuilder::new(Network::local(), ASSET, BlockchainId([0xcc; 32]))
            .with_fee(10);
        let result = builder.base_tx(
            &utxos,
            vec![SENDER],
            vec![DEST],
            vec![SENDER],
            ASSET,
            100,
            vec![0u8; MAX_MEMO_LEN + extra],
            0,
        );
        prop_assert!(
            matches!(result, Err(Error::MemoTooLarge { .. })),
            "expected MemoTooLarge, got {:?}",
            result
        );
    }
}
