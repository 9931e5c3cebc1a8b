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

//! Wallet
//!
//! This module defines the [`Wallet`] trait, the source of the coins borrowed by an
//! [`InputSet`](crate::sweep::InputSet) when its own inputs can't pay for the sweep.
//!
//! A simple in-memory implementation is provided by [`MemoryWallet`].

use crate::error::Error;
use crate::types::WalletUtxo;

pub mod memory;

pub use memory::MemoryWallet;

/// Minimum number of confirmations of the wallet UTXOs used by a sweep. Spending unconfirmed
/// coins would tie the sweep to the RBF rules of their parents.
pub const MIN_CONFS: u32 = 1;

/// Upper bound passed to [`Wallet::list_unspent_witness`] when any depth is fine
pub const MAX_CONFS: u32 = i32::MAX as u32;

/// Source of the wallet coins
///
/// Implementations are expected to be backed by the node's on-chain wallet. The input sets never
/// lock coins themselves: the caller must hold [`Wallet::with_coin_select_lock`] from the moment
/// it checks whether wallet inputs are needed until the sweep has been published, otherwise two
/// concurrent sweeps may pick the same UTXOs.
pub trait Wallet {
    /// List the SegWit UTXOs of the default account with a number of confirmations between
    /// `min_confs` and `max_confs`, both included
    fn list_unspent_witness(&self, min_confs: u32, max_confs: u32)
        -> Result<Vec<WalletUtxo>, Error>;

    /// Run `f` while holding the coin selection lock of the wallet
    fn with_coin_select_lock(
        &self,
        f: &mut dyn FnMut() -> Result<(), Error>,
    ) -> Result<(), Error> {
        f()
    }
}

/// Returns the confirmed UTXOs of `wallet`, smallest first
///
/// Small coins go first so that a sweep doesn't lock a large UTXO for a small contribution.
pub(crate) fn list_confirmed_sorted(wallet: &dyn Wallet) -> Result<Vec<WalletUtxo>, Error> {
    let mut utxos = wallet.list_unspent_witness(MIN_CONFS, MAX_CONFS)?;
    utxos.sort_by_key(|utxo| utxo.txout.value);

    Ok(utxos)
}
