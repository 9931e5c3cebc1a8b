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

//! Budget based input set
//!
//! A [`BudgetInputSet`] groups inputs sharing the same deadline, each of them carrying the
//! amount it's willing to spend on fees. Inputs with a required output can't pay for their own
//! budget, which has to be borrowed from the other inputs or, failing that, from the wallet.

use std::collections::HashSet;
use std::fmt;

use bitcoin::{Amount, FeeRate, SignedAmount};

use log::{debug, trace};

use crate::error::Error;
use crate::types::{Params, SpendableInput, SweeperInput};
use crate::wallet::{list_confirmed_sorted, Wallet};

use super::utils::{create_wallet_tx_input, to_signed};
use super::InputSet;

/// Input set built from inputs sharing a deadline, each with its own fee budget
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetInputSet {
    inputs: Vec<SweeperInput>,
    deadline_height: u32,
}

// Batches must be non empty, share `deadline_height` when they have one and hold distinct
// outpoints
fn validate_inputs(inputs: &[SweeperInput], deadline_height: u32) -> Result<(), Error> {
    if inputs.is_empty() {
        return Err(Error::EmptyInputs);
    }

    if let Some(found) = inputs
        .iter()
        .filter_map(|input| input.params.deadline_height)
        .find(|height| *height != deadline_height)
    {
        return Err(Error::DeadlineMismatch {
            expected: deadline_height,
            found,
        });
    }

    let mut seen = HashSet::with_capacity(inputs.len());
    for input in inputs {
        if !seen.insert(input.outpoint()) {
            return Err(Error::DuplicateInputs(input.outpoint()));
        }
    }

    Ok(())
}

// Whether the input can't even pay for its own budget
fn exceeds_value(input: &SweeperInput) -> bool {
    input.params.budget > input.input.value()
}

impl BudgetInputSet {
    /// Create a new set from `inputs`, which must all be confirmed by `deadline_height`
    pub fn new(inputs: Vec<SweeperInput>, deadline_height: u32) -> Result<Self, Error> {
        validate_inputs(&inputs, deadline_height)?;

        let set = BudgetInputSet {
            inputs,
            deadline_height,
        };
        trace!("Created {}", set);

        Ok(set)
    }

    /// Inputs of the set along with their parameters
    pub fn sweeper_inputs(&self) -> &[SweeperInput] {
        &self.inputs
    }

    // Adds wallet utxos, smallest first, until the budget is covered. Returns whether it is.
    fn try_add_wallet_inputs(&mut self, wallet: &dyn Wallet) -> Result<bool, Error> {
        // Only confirmed utxos, the configured coin selection strategy is ignored
        let utxos = list_confirmed_sorted(wallet)?;

        for utxo in &utxos {
            let input = create_wallet_tx_input(utxo)?;

            self.inputs.push(SweeperInput::new(
                input,
                Params {
                    deadline_height: Some(self.deadline_height),
                    ..Default::default()
                },
            ));

            if !self.need_wallet_input() {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

impl fmt::Display for BudgetInputSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BudgetInputSet(budget={} sat, deadline={}, inputs=[",
            self.budget().to_sat(),
            self.deadline_height
        )?;
        for input in &self.inputs {
            write!(f, "\n{}", input)?;
        }
        write!(f, "])")
    }
}

impl InputSet for BudgetInputSet {
    fn inputs(&self) -> Vec<&SpendableInput> {
        self.inputs.iter().map(|input| &input.input).collect()
    }

    fn add_wallet_inputs(&mut self, wallet: &dyn Wallet) -> Result<(), Error> {
        let original = self.inputs.clone();

        match self.try_add_wallet_inputs(wallet) {
            Ok(true) => Ok(()),
            Ok(false) => {
                debug!(
                    "Not enough wallet inputs to cover the budget of {}",
                    self.budget()
                );
                self.inputs = original;
                Err(Error::NotEnoughInputs)
            }
            Err(e) => {
                self.inputs = original;
                Err(e)
            }
        }
    }

    /// Whether the inputs can't cover the budget on their own
    ///
    /// An input with a required output must keep its value for that output, so its budget has
    /// to be borrowed from what the other inputs have left after paying their own.
    fn need_wallet_input(&self) -> bool {
        let mut budget_needed = SignedAmount::ZERO;
        let mut budget_borrowable = SignedAmount::ZERO;

        for input in &self.inputs {
            let budget = to_signed(input.params.budget);

            if input.input.required_output.is_some() {
                budget_needed += budget;
                continue;
            }

            if exceeds_value(input) {
                debug!(
                    "Input {} specified a budget that exceeds its output value: {} > {}",
                    input.input,
                    input.params.budget,
                    input.input.value()
                );
            }

            budget_borrowable += to_signed(input.input.value()) - budget;
        }

        trace!(
            "need_wallet_input: budget_needed={}, budget_borrowable={}",
            budget_needed,
            budget_borrowable
        );

        budget_borrowable < budget_needed
    }

    fn deadline_height(&self) -> Option<u32> {
        Some(self.deadline_height)
    }

    fn budget(&self) -> Amount {
        self.inputs.iter().map(|input| input.params.budget).sum()
    }

    fn starting_fee_rate(&self) -> Option<FeeRate> {
        self.inputs
            .iter()
            .filter_map(|input| input.params.starting_fee_rate)
            .max()
    }
}
