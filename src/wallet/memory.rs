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

//! In-memory wallet
//!
//! This module defines an in-memory [`Wallet`], mostly useful for tests and for embedders that
//! track their coins elsewhere.

use std::collections::BTreeMap;
use std::sync::Mutex;

use bitcoin::{Amount, OutPoint};

use log::trace;

use crate::error::Error;
use crate::types::WalletUtxo;

use super::Wallet;

/// In-memory wallet
///
/// UTXOs are stored along with their number of confirmations, keyed by outpoint.
#[derive(Debug, Default)]
pub struct MemoryWallet {
    utxos: BTreeMap<OutPoint, (WalletUtxo, u32)>,
    coin_select_lock: Mutex<()>,
}

impl MemoryWallet {
    /// Create a new empty wallet
    pub fn new() -> Self {
        Default::default()
    }

    /// Insert a UTXO with `confirmations` confirmations, replacing any UTXO with the same
    /// outpoint
    pub fn insert_utxo(&mut self, utxo: WalletUtxo, confirmations: u32) {
        self.utxos.insert(utxo.outpoint, (utxo, confirmations));
    }

    /// Remove a UTXO, returning it if it was present
    pub fn remove_utxo(&mut self, outpoint: &OutPoint) -> Option<WalletUtxo> {
        self.utxos.remove(outpoint).map(|(utxo, _)| utxo)
    }

    /// Number of UTXOs, confirmed or not
    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    /// Whether the wallet holds no UTXO
    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Total value of the UTXOs with at least `min_confs` confirmations
    pub fn balance(&self, min_confs: u32) -> Amount {
        self.utxos
            .values()
            .filter(|(_, confs)| *confs >= min_confs)
            .map(|(utxo, _)| utxo.txout.value)
            .sum()
    }
}

impl Wallet for MemoryWallet {
    fn list_unspent_witness(
        &self,
        min_confs: u32,
        max_confs: u32,
    ) -> Result<Vec<WalletUtxo>, Error> {
        let utxos = self
            .utxos
            .values()
            .filter(|(_, confs)| *confs >= min_confs && *confs <= max_confs)
            .map(|(utxo, _)| utxo.clone())
            .collect::<Vec<_>>();

        trace!(
            "Listed {} of {} utxos with {}..={} confirmations",
            utxos.len(),
            self.utxos.len(),
            min_confs,
            max_confs
        );

        Ok(utxos)
    }

    fn with_coin_select_lock(
        &self,
        f: &mut dyn FnMut() -> Result<(), Error>,
    ) -> Result<(), Error> {
        let _guard = self
            .coin_select_lock
            .lock()
            .map_err(|_| Error::Generic("coin select lock poisoned".to_string()))?;

        f()
    }
}
