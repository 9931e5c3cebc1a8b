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

//! Sweep input sets
//!
//! This module provides the trait [`InputSet`], implemented by the two builders that decide
//! which inputs end up in a sweep transaction:
//!
//! - [`TxInputSet`] admits inputs only when they increase the value left to us after fees, and
//!   borrows wallet coins when the result would otherwise be dust.
//! - [`BudgetInputSet`] takes a batch of inputs sharing a deadline, each carrying its own fee
//!   budget, and borrows wallet coins when the inputs can't fund the budget themselves.
//!
//! The caller must hold the wallet's coin selection lock (see
//! [`Wallet::with_coin_select_lock`]) for the whole construction of a set, from
//! [`InputSet::need_wallet_input`] to [`InputSet::add_wallet_inputs`].

use bitcoin::{Amount, FeeRate};

use crate::error::Error;
use crate::types::SpendableInput;
use crate::wallet::Wallet;

pub mod budget_input_set;
pub mod config;
pub mod tx_input_set;
pub mod utils;
pub mod weight;
pub mod witness;

pub use budget_input_set::BudgetInputSet;
pub use config::InputSetConfig;
pub use tx_input_set::TxInputSet;

/// Constraints applied when admitting an input into a [`TxInputSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddConstraints {
    /// The input must have a positive yield
    Regular,
    /// Wallet input, only added to bring the output value above the dust limit. Not counted
    /// against the max number of inputs.
    Wallet,
    /// The input must be swept even with a negative yield at the current fee rate
    Force,
}

/// A set of inputs a sweep transaction can be built from
pub trait InputSet {
    /// Inputs to use in the transaction, in order
    fn inputs(&self) -> Vec<&SpendableInput>;

    /// Add wallet inputs until the set can be swept.
    ///
    /// Returns [`Error::NotEnoughInputs`] if the wallet doesn't hold enough coins, in which case
    /// the set is left exactly as it was before the call.
    fn add_wallet_inputs(&mut self, wallet: &dyn Wallet) -> Result<(), Error>;

    /// Whether wallet inputs are needed before the set can be swept
    fn need_wallet_input(&self) -> bool;

    /// Height by which the set must be confirmed, `None` if there is no time pressure
    fn deadline_height(&self) -> Option<u32>;

    /// Total amount this set may spend on fees
    fn budget(&self) -> Amount;

    /// Highest fee rate a previous attempt already started from, if any
    fn starting_fee_rate(&self) -> Option<FeeRate>;
}
