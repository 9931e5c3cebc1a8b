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

//! Sweep input selection
//!
//! After a channel closes or a contract resolves, several outputs become spendable by the node,
//! each with its own time pressure and fee budget. This crate decides which of those outputs go
//! into a single sweep transaction, whether wallet coins have to be borrowed to clear the dust
//! limit or the fee budget, and what budget, deadline and starting fee rate the resulting set
//! carries.
//!
//! Two builders are provided, both implementing [`InputSet`]:
//!
//! - [`TxInputSet`] admits inputs one at a time with a fee rate driven yield test.
//! - [`BudgetInputSet`] groups inputs which already carry an explicit budget and share a
//!   deadline.
//!
//! Signing, broadcasting and grouping candidates by deadline are left to the caller.
//!
//! ## Example
//!
//! ```
//! # use bitcoin::hashes::Hash;
//! # use bitcoin::{Amount, FeeRate, OutPoint, ScriptBuf, TxOut, Txid};
//! use bdk_sweep::sweep::{InputSet, TxInputSet};
//! use bdk_sweep::wallet::MemoryWallet;
//! use bdk_sweep::{Params, SpendableInput, SweeperInput, WitnessType};
//!
//! let input = SpendableInput::new(
//!     OutPoint::new(Txid::all_zeros(), 0),
//!     TxOut {
//!         value: Amount::from_sat(100_000),
//!         script_pubkey: ScriptBuf::from_bytes(vec![0x00; 22]),
//!     },
//!     WitnessType::CommitmentTimeLock,
//! );
//!
//! let mut set = TxInputSet::new(
//!     FeeRate::from_sat_per_kwu(1_000),
//!     FeeRate::from_sat_per_kwu(250_000),
//!     100,
//! );
//! set.add_positive_yield_inputs(&[SweeperInput::new(input, Params::default())]);
//!
//! let wallet = MemoryWallet::default();
//! set.add_wallet_inputs(&wallet)?;
//! assert_eq!(set.inputs().len(), 1);
//! # Ok::<(), bdk_sweep::Error>(())
//! ```

// only enables the `doc_cfg` feature when
// the `docsrs` configuration attribute is defined
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

pub extern crate bitcoin;
extern crate log;
extern crate serde;
extern crate serde_json;

#[macro_use]
pub(crate) mod error;
pub mod sweep;
pub(crate) mod types;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testutils;

pub use error::Error;
pub use sweep::witness::WitnessType;
pub use sweep::{BudgetInputSet, InputSet, InputSetConfig, TxInputSet};
pub use types::*;
pub use wallet::Wallet;
