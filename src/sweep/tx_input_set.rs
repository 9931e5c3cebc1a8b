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

//! Yield based input set
//!
//! [`TxInputSet`] accumulates inputs while keeping running totals of the transaction being built.
//! Each admission is evaluated on a copy of the current state, which replaces it only if the
//! input is accepted: a rejected input leaves no trace.

use bitcoin::{Amount, FeeRate, SignedAmount};

use log::{debug, error};

use crate::error::Error;
use crate::types::{SpendableInput, SweeperInput};
use crate::wallet::{list_confirmed_sorted, Wallet};

use super::config::InputSetConfig;
use super::utils::{
    change_dust_limit, create_wallet_tx_input, dust_limit, input_type_summary, to_signed,
    to_unsigned_or_zero, IsDust,
};
use super::weight::WeightEstimator;
use super::{AddConstraints, InputSet};

#[derive(Debug, Clone, PartialEq)]
struct TxInputSetState {
    fee_rate: FeeRate,
    max_fee_rate: FeeRate,
    // Total value of the inputs
    input_total: Amount,
    // Sum of the outputs the inputs commit to
    required_output: Amount,
    // What's left of `input_total` once `required_output` and the fee, change output included,
    // are paid. Can be dust or even negative.
    change_output: SignedAmount,
    inputs: Vec<SpendableInput>,
    // Total value of the inputs borrowed from the wallet
    wallet_input_total: Amount,
    // Whether the set contains an input that must be swept regardless of its yield
    force: bool,
}

impl TxInputSetState {
    fn new(fee_rate: FeeRate, max_fee_rate: FeeRate) -> Self {
        TxInputSetState {
            fee_rate,
            max_fee_rate,
            input_total: Amount::ZERO,
            required_output: Amount::ZERO,
            change_output: SignedAmount::ZERO,
            inputs: vec![],
            wallet_input_total: Amount::ZERO,
            force: false,
        }
    }

    // Worst case estimate of the transaction, with or without a change output
    fn weight_estimate(&self, change: bool) -> Result<WeightEstimator, Error> {
        let mut estimator = WeightEstimator::new(self.fee_rate, self.max_fee_rate);
        for input in &self.inputs {
            estimator.add(input)?;

            if let Some(required_output) = &input.required_output {
                estimator.add_output(required_output);
            }
        }

        if change {
            estimator.add_p2tr_output();
        }

        Ok(estimator)
    }

    // Total amount left for us after paying fees. Might be dust.
    fn total_output(&self) -> SignedAmount {
        to_signed(self.required_output) + self.change_output
    }
}

/// Input set built from inputs sorted by yield
///
/// Inputs are admitted as long as they increase the value left to us after paying fees at
/// `fee_rate`, inputs marked as immediate are admitted unconditionally. If the result is too
/// small to create a non-dust output, [`InputSet::add_wallet_inputs`] borrows wallet coins.
#[derive(Debug, Clone)]
pub struct TxInputSet {
    state: TxInputSetState,
    // Max number of inputs, wallet inputs excluded
    max_inputs: u32,
}

impl TxInputSet {
    /// Create a new empty set
    pub fn new(fee_rate: FeeRate, max_fee_rate: FeeRate, max_inputs: u32) -> Self {
        TxInputSet {
            state: TxInputSetState::new(fee_rate, max_fee_rate),
            max_inputs,
        }
    }

    /// Create a new empty set using the limits in `config`
    pub fn from_config(fee_rate: FeeRate, config: &InputSetConfig) -> Self {
        Self::new(fee_rate, config.max_fee_rate(), config.max_inputs)
    }

    /// Fee rate the set is built for
    pub fn fee_rate(&self) -> FeeRate {
        self.state.fee_rate
    }

    /// Total value of the inputs
    pub fn input_total(&self) -> Amount {
        self.state.input_total
    }

    /// Sum of the required outputs of the inputs
    pub fn required_output(&self) -> Amount {
        self.state.required_output
    }

    /// Value of the change output, which might be dust or negative
    pub fn change_output(&self) -> SignedAmount {
        self.state.change_output
    }

    /// Value left to us after paying fees
    pub fn total_output(&self) -> SignedAmount {
        self.state.total_output()
    }

    /// Total value borrowed from the wallet
    pub fn wallet_input_total(&self) -> Amount {
        self.state.wallet_input_total
    }

    /// Whether an input that must be swept regardless of its yield was admitted
    pub fn is_force(&self) -> bool {
        self.state.force
    }

    /// Try to add `input` under `constraints`, returning whether it was accepted
    pub fn add(&mut self, input: &SpendableInput, constraints: AddConstraints) -> bool {
        match self.add_to_state(input, constraints) {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    // Computes the state the set would have with `input`, `None` if the input is rejected
    fn add_to_state(
        &self,
        input: &SpendableInput,
        constraints: AddConstraints,
    ) -> Option<TxInputSetState> {
        // We don't know in advance how many wallet inputs we need, so they aren't capped
        if constraints != AddConstraints::Wallet
            && self.state.inputs.len() >= self.max_inputs as usize
        {
            debug!(
                "Rejected input={} because max inputs {} is reached",
                input, self.max_inputs
            );
            return None;
        }

        if let Some(required_output) = &input.required_output {
            if required_output.value.is_dust(&required_output.script_pubkey) {
                // TODO: force sweeps should not be dropped here, a min relay fee increase
                // between the request and now can turn their required output into dust
                error!(
                    "Rejected input={} due to dust required output={}, limit={}",
                    input,
                    required_output.value,
                    dust_limit(&required_output.script_pubkey)
                );
                return None;
            }
        }

        let mut new_state = self.state.clone();
        new_state.inputs.push(input.clone());

        let value = input.value();
        new_state.input_total += value;

        let fee = match new_state.weight_estimate(true) {
            Ok(estimator) => estimator.fee_with_parent(),
            Err(e) => {
                error!("Rejected input={}: {}", input, e);
                return None;
            }
        };

        if let Some(required_output) = &input.required_output {
            new_state.required_output += required_output.value;
        }

        // Negative when the input is forced in with a negative yield
        new_state.change_output = to_signed(new_state.input_total)
            - to_signed(new_state.required_output)
            - to_signed(fee);

        let input_yield = new_state.total_output() - self.state.total_output();

        match constraints {
            AddConstraints::Regular => {
                if input_yield <= SignedAmount::ZERO {
                    debug!(
                        "Rejected regular input={} due to negative yield={}",
                        value, input_yield
                    );
                    return None;
                }
            }

            // Forced inputs come first, so a regular input added afterwards still sees its
            // yield increase even if `change_output` went negative.
            AddConstraints::Force => {
                new_state.force = true;
            }

            AddConstraints::Wallet => {
                // TODO: accept a zero yield to allow consolidating small wallet UTXOs
                if input_yield <= SignedAmount::ZERO {
                    debug!(
                        "Rejected wallet input={} due to negative yield={}",
                        value, input_yield
                    );
                    return None;
                }

                new_state.wallet_input_total += value;

                // Don't put more of our own coins into the sweep than we get out of it, unless
                // a forced input has to go through anyway.
                if !new_state.force
                    && to_signed(new_state.wallet_input_total) >= new_state.total_output()
                {
                    debug!(
                        "Rejecting wallet input of {}, because it would make a negative yielding \
                         transaction ({})",
                        value,
                        new_state.total_output() - to_signed(new_state.wallet_input_total)
                    );
                    return None;
                }
            }
        }

        Some(new_state)
    }

    /// Add the inputs that have a positive yield.
    ///
    /// `inputs` must be sorted by descending yield: the first rejected input stops the process,
    /// as none of the following ones would be accepted either.
    pub fn add_positive_yield_inputs(&mut self, inputs: &[SweeperInput]) {
        for (i, sweeper_input) in inputs.iter().enumerate() {
            let constraints = if sweeper_input.params.immediate {
                AddConstraints::Force
            } else {
                AddConstraints::Regular
            };

            if !self.add(&sweeper_input.input, constraints) {
                let remaining = &inputs[i..];
                debug!(
                    "{} negative yield inputs not added to input set: {}",
                    remaining.len(),
                    input_type_summary(remaining.iter().map(|r| &r.input))
                );
                return;
            }

            debug!(
                "Added positive yield input {} to input set",
                sweeper_input.input
            );
        }
    }

    /// Whether the set pays its fees and has at least one output above the dust limit
    pub fn enough_input(&self) -> bool {
        if self.state.change_output >= to_signed(change_dust_limit()) {
            return true;
        }

        // No change output, check that we can pay the fees of a transaction without it
        let fee = match self.state.weight_estimate(false) {
            Ok(estimator) => estimator.fee_with_parent(),
            Err(e) => {
                error!("Unable to estimate the input set fee: {}", e);
                return false;
            }
        };
        if self.state.input_total < self.state.required_output + fee {
            return false;
        }

        // Required outputs are only admitted above dust, one of them is enough
        self.state
            .inputs
            .iter()
            .any(|input| input.required_output.is_some())
    }

    // Add wallet utxos, smallest first, until `enough_input` holds or the wallet runs out
    fn try_add_wallet_inputs(&mut self, wallet: &dyn Wallet) -> Result<(), Error> {
        // Only confirmed utxos, the configured coin selection strategy is ignored
        let utxos = list_confirmed_sorted(wallet)?;

        for utxo in &utxos {
            let input = create_wallet_tx_input(utxo)?;

            if !self.add(&input, AddConstraints::Wallet) {
                continue;
            }

            if self.enough_input() {
                return Ok(());
            }
        }

        Ok(())
    }
}

impl InputSet for TxInputSet {
    fn inputs(&self) -> Vec<&SpendableInput> {
        self.state.inputs.iter().collect()
    }

    fn add_wallet_inputs(&mut self, wallet: &dyn Wallet) -> Result<(), Error> {
        if self.enough_input() {
            return Ok(());
        }

        let original = self.state.clone();

        if let Err(e) = self.try_add_wallet_inputs(wallet) {
            self.state = original;
            return Err(e);
        }

        if !self.enough_input() {
            debug!(
                "Input set value {} (required={}, change={}) below dust limit of {}",
                self.state.total_output(),
                self.state.required_output,
                self.state.change_output,
                change_dust_limit()
            );

            self.state = original;
            return Err(Error::NotEnoughInputs);
        }

        Ok(())
    }

    fn need_wallet_input(&self) -> bool {
        !self.enough_input()
    }

    fn deadline_height(&self) -> Option<u32> {
        None
    }

    fn budget(&self) -> Amount {
        to_unsigned_or_zero(self.state.total_output())
    }

    fn starting_fee_rate(&self) -> Option<FeeRate> {
        None
    }
}
