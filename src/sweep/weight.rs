// Bitcoin Dev Kit
// Written in 2020 by Alekos Filini <alekos.filini@gmail.com>
//
// Copyright (c) 2020-2021 Bitcoin Dev Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Weight and fee estimation
//!
//! [`TxWeightEstimator`] computes an upper bound of the weight of a transaction from its inputs
//! and outputs. [`WeightEstimator`] turns that weight into a fee, paying for unconfirmed parents
//! when needed and never exceeding the configured maximum fee rate.

use std::collections::HashSet;

use bitcoin::{Amount, FeeRate, TxOut, Txid, Weight};

use log::{trace, warn};

use crate::error::Error;
use crate::types::SpendableInput;

use super::utils::{fee_for_weight, varint_size, P2TR_SIZE};
use super::witness::{NESTED_P2WPKH_SCRIPT_SIG_SIZE, P2WKH_WITNESS_SIZE};

/// nVersion and nLockTime
pub const BASE_TX_SIZE: u64 = 4 + 4;

/// Txin fields without the script sig: outpoint (32+4), script sig length (1) and nSequence (4)
pub const INPUT_SIZE: u64 = 32 + 4 + 1 + 4;

/// SegWit marker and flag
pub const WITNESS_HEADER_SIZE: u64 = 1 + 1;

/// Serialized P2TR output: value, script length and script
pub const P2TR_OUTPUT_SIZE: u64 = 8 + 1 + P2TR_SIZE as u64;

const WITNESS_SCALE_FACTOR: u64 = 4;

/// Accumulates the sizes of the inputs and outputs of a transaction to compute its weight
#[derive(Debug, Clone, Default)]
pub struct TxWeightEstimator {
    has_witness: bool,
    input_count: usize,
    output_count: usize,
    input_size: u64,
    input_witness_size: u64,
    output_size: u64,
}

impl TxWeightEstimator {
    /// Add a SegWit input whose witness is `witness_size` bytes
    pub fn add_witness_input(&mut self, witness_size: u64) -> &mut Self {
        self.input_size += INPUT_SIZE;
        self.input_witness_size += witness_size;
        self.input_count += 1;
        self.has_witness = true;

        self
    }

    /// Add a P2WPKH input nested in P2SH
    pub fn add_nested_p2wkh_input(&mut self) -> &mut Self {
        self.input_size += INPUT_SIZE + NESTED_P2WPKH_SCRIPT_SIG_SIZE;
        self.input_witness_size += P2WKH_WITNESS_SIZE;
        self.input_count += 1;
        self.has_witness = true;

        self
    }

    /// Add an arbitrary output
    pub fn add_tx_output(&mut self, txout: &TxOut) -> &mut Self {
        let script_len = txout.script_pubkey.len();
        self.output_size += 8 + varint_size(script_len) + script_len as u64;
        self.output_count += 1;

        self
    }

    /// Add a P2TR output
    pub fn add_p2tr_output(&mut self) -> &mut Self {
        self.output_size += P2TR_OUTPUT_SIZE;
        self.output_count += 1;

        self
    }

    /// Number of inputs added so far
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Number of outputs added so far
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Upper bound of the weight of the transaction
    pub fn weight(&self) -> Weight {
        let stripped_size = BASE_TX_SIZE
            + varint_size(self.input_count)
            + self.input_size
            + varint_size(self.output_count)
            + self.output_size;

        let mut weight = stripped_size * WITNESS_SCALE_FACTOR;
        if self.has_witness {
            weight += WITNESS_HEADER_SIZE + self.input_witness_size;
        }

        Weight::from_wu(weight)
    }
}

/// Fee estimation for a sweep transaction
///
/// Inputs spending an unconfirmed output make the sweep pay for the fee deficit of their parent,
/// so that the package reaches the target fee rate. The resulting fee is capped by
/// `max_fee_rate` applied to the weight of the sweep alone, unless `max_fee_rate` is zero.
#[derive(Debug, Clone)]
pub struct WeightEstimator {
    estimator: TxWeightEstimator,
    fee_rate: FeeRate,
    max_fee_rate: FeeRate,
    parents: HashSet<Txid>,
    parents_fee: Amount,
    parents_weight: Weight,
}

impl WeightEstimator {
    /// Create a new estimator targeting `fee_rate`, never paying more than `max_fee_rate`
    pub fn new(fee_rate: FeeRate, max_fee_rate: FeeRate) -> Self {
        WeightEstimator {
            estimator: TxWeightEstimator::default(),
            fee_rate,
            max_fee_rate,
            parents: HashSet::new(),
            parents_fee: Amount::ZERO,
            parents_weight: Weight::ZERO,
        }
    }

    /// Add an input, failing if its witness can't be sized
    pub fn add(&mut self, input: &SpendableInput) -> Result<(), Error> {
        input
            .witness_type
            .add_weight_estimation(&mut self.estimator)?;

        self.try_add_parent(input);

        Ok(())
    }

    // Adds the unconfirmed parent of `input`, if its own fee rate is below the target
    fn try_add_parent(&mut self, input: &SpendableInput) {
        let parent = match input.unconfirmed_parent {
            Some(parent) => parent,
            None => return,
        };

        let parent_fee_rate = match parent.weight.to_wu() {
            0 => return,
            wu => FeeRate::from_sat_per_kwu(parent.fee.to_sat().saturating_mul(1000) / wu),
        };
        if parent_fee_rate >= self.fee_rate {
            return;
        }

        // Several inputs may come from the same parent
        if !self.parents.insert(input.outpoint.txid) {
            return;
        }

        trace!(
            "Paying for unconfirmed parent {} (fee={}, weight={})",
            input.outpoint.txid,
            parent.fee,
            parent.weight.to_wu()
        );

        self.parents_fee += parent.fee;
        self.parents_weight = self.parents_weight + parent.weight;
    }

    /// Add an arbitrary output
    pub fn add_output(&mut self, txout: &TxOut) {
        self.estimator.add_tx_output(txout);
    }

    /// Add a P2TR output, used to model the change
    pub fn add_p2tr_output(&mut self) {
        self.estimator.add_p2tr_output();
    }

    /// Weight of the sweep transaction alone
    pub fn weight(&self) -> Weight {
        self.estimator.weight()
    }

    /// Fee of the sweep transaction alone at the target fee rate
    pub fn fee(&self) -> Amount {
        fee_for_weight(self.fee_rate, self.weight())
    }

    /// Fee of the sweep transaction including what's owed by unconfirmed parents
    pub fn fee_with_parent(&self) -> Amount {
        let tx_weight = self.weight();
        let child_fee = fee_for_weight(self.fee_rate, tx_weight);

        let total_weight = tx_weight + self.parents_weight;
        let mut fee = fee_for_weight(self.fee_rate, total_weight)
            .checked_sub(self.parents_fee)
            .unwrap_or(Amount::ZERO);

        // Never pay less than the sweep alone needs
        if fee < child_fee {
            fee = child_fee;
        }

        if self.max_fee_rate == FeeRate::ZERO {
            return fee;
        }

        let max_fee = fee_for_weight(self.max_fee_rate, tx_weight);
        if fee > max_fee {
            warn!(
                "Fee {} for weight {} exceeds max fee rate {} sat/kwu, using {} instead",
                fee,
                tx_weight.to_wu(),
                self.max_fee_rate.to_sat_per_kwu(),
                max_fee
            );
            fee = max_fee;
        }

        fee
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sweep::witness::WitnessType;
    use crate::testutils::*;
    use crate::types::TxInfo;

    #[test]
    fn test_weight_p2wpkh_in_p2tr_out() {
        let mut estimator = TxWeightEstimator::default();
        estimator.add_witness_input(P2WKH_WITNESS_SIZE).add_p2tr_output();

        // (8 + 1 + 41 + 1 + 43) * 4 + 2 + 109
        assert_eq!(estimator.weight(), Weight::from_wu(487));
        assert_eq!(estimator.input_count(), 1);
        assert_eq!(estimator.output_count(), 1);
    }

    #[test]
    fn test_weight_without_witness() {
        let mut estimator = TxWeightEstimator::default();
        estimator.add_tx_output(&txout(1_000));

        // (8 + 1 + 0 + 1 + 31) * 4, no marker and flag
        assert_eq!(estimator.weight(), Weight::from_wu(164));
    }

    #[test]
    fn test_fee_without_parent() {
        let mut estimator =
            WeightEstimator::new(FeeRate::from_sat_per_kwu(1_000), FeeRate::ZERO);
        estimator.add(&wpkh_input(1, 10_000)).unwrap();
        estimator.add_p2tr_output();

        assert_eq!(estimator.weight(), Weight::from_wu(487));
        assert_eq!(estimator.fee(), Amount::from_sat(487));
        assert_eq!(estimator.fee_with_parent(), Amount::from_sat(487));
    }

    #[test]
    fn test_add_unsupported_witness_type() {
        let mut estimator =
            WeightEstimator::new(FeeRate::from_sat_per_kwu(1_000), FeeRate::ZERO);
        let err = estimator
            .add(&input(1, 10_000, WitnessType::Unsupported(3)))
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedWitnessType(_)));
    }

    #[test]
    fn test_fee_with_low_fee_parent() {
        let parent = TxInfo {
            fee: Amount::from_sat(100),
            weight: Weight::from_wu(1_000),
        };
        let mut estimator =
            WeightEstimator::new(FeeRate::from_sat_per_kwu(1_000), FeeRate::ZERO);
        estimator
            .add(&wpkh_input(1, 10_000).with_unconfirmed_parent(parent))
            .unwrap();
        // Same parent, must only be paid for once
        let mut sibling = wpkh_input(2, 10_000).with_unconfirmed_parent(parent);
        sibling.outpoint.txid = outpoint(1).txid;
        estimator.add(&sibling).unwrap();
        estimator.add_p2tr_output();

        let tx_weight = estimator.weight().to_wu();
        // The package pays 1 sat/wu, the parent already paid 100
        assert_eq!(
            estimator.fee_with_parent(),
            Amount::from_sat(tx_weight + 1_000 - 100)
        );
    }

    #[test]
    fn test_fee_with_high_fee_parent() {
        let parent = TxInfo {
            fee: Amount::from_sat(5_000),
            weight: Weight::from_wu(1_000),
        };
        let mut estimator =
            WeightEstimator::new(FeeRate::from_sat_per_kwu(1_000), FeeRate::ZERO);
        estimator
            .add(&wpkh_input(1, 10_000).with_unconfirmed_parent(parent))
            .unwrap();
        estimator.add_p2tr_output();

        // The parent pays enough on its own
        assert_eq!(estimator.fee_with_parent(), estimator.fee());
    }

    #[test]
    fn test_fee_clamped_to_max_fee_rate() {
        let parent = TxInfo {
            fee: Amount::ZERO,
            weight: Weight::from_wu(100_000),
        };
        let mut estimator = WeightEstimator::new(
            FeeRate::from_sat_per_kwu(1_000),
            FeeRate::from_sat_per_kwu(2_000),
        );
        estimator
            .add(&wpkh_input(1, 10_000).with_unconfirmed_parent(parent))
            .unwrap();
        estimator.add_p2tr_output();

        assert_eq!(estimator.fee_with_parent(), Amount::from_sat(2 * 487));
    }
}
