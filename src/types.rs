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

use std::fmt;

use bitcoin::{Amount, FeeRate, OutPoint, TxOut, Weight};

use crate::sweep::witness::WitnessType;

/// Address types a [`Wallet`](crate::wallet::Wallet) may report for its UTXOs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    /// Native SegWit v0 pay-to-witness-pubkey-hash
    WitnessPubKey,
    /// P2WPKH nested in P2SH
    NestedWitnessPubKey,
    /// SegWit v1 key path spend
    TaprootPubkey,
    /// Legacy pay-to-pubkey-hash
    PubKeyHash,
    /// Anything else the wallet couldn't classify
    Unknown,
}

/// An unspent output owned by the wallet, as returned by
/// [`Wallet::list_unspent_witness`](crate::wallet::Wallet::list_unspent_witness)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletUtxo {
    /// Reference to a transaction output
    pub outpoint: OutPoint,
    /// Transaction output
    pub txout: TxOut,
    /// Address type of the output script
    pub address_type: AddressType,
}

/// Fee and weight of a transaction that hasn't confirmed yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxInfo {
    /// Absolute fee paid by the transaction
    pub fee: Amount,
    /// Weight of the transaction
    pub weight: Weight,
}

/// An output that can be swept
///
/// Instances are produced by whatever resolved the contract (a closed channel, an HTLC, a wallet
/// UTXO) and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpendableInput {
    /// Outpoint being spent
    pub outpoint: OutPoint,
    /// Output being spent
    pub txout: TxOut,
    /// Witness classification, used for weight estimation
    pub witness_type: WitnessType,
    /// Output the spending transaction has to carry along with this input, if any
    pub required_output: Option<TxOut>,
    /// Unconfirmed transaction creating `outpoint`, if any. Its fee deficit is paid by the sweep.
    pub unconfirmed_parent: Option<TxInfo>,
}

impl SpendableInput {
    /// Create a new [`SpendableInput`] without a required output or an unconfirmed parent
    pub fn new(outpoint: OutPoint, txout: TxOut, witness_type: WitnessType) -> Self {
        SpendableInput {
            outpoint,
            txout,
            witness_type,
            required_output: None,
            unconfirmed_parent: None,
        }
    }

    /// Attach the output that must be created together with this input
    pub fn with_required_output(mut self, required_output: TxOut) -> Self {
        self.required_output = Some(required_output);
        self
    }

    /// Attach the fee and weight of the unconfirmed transaction creating this output
    pub fn with_unconfirmed_parent(mut self, parent: TxInfo) -> Self {
        self.unconfirmed_parent = Some(parent);
        self
    }

    /// Value of the output being spent
    pub fn value(&self) -> Amount {
        self.txout.value
    }
}

impl fmt::Display for SpendableInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.outpoint, self.witness_type)
    }
}

/// Economic parameters attached to an input by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Params {
    /// Maximum amount this input may spend on fees
    pub budget: Amount,
    /// Height by which the input must be confirmed, `None` if there is no time pressure
    pub deadline_height: Option<u32>,
    /// Whether the input has to be swept even if it doesn't pay for itself
    pub immediate: bool,
    /// Fee rate a previous sweep attempt already started from, if any
    pub starting_fee_rate: Option<FeeRate>,
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "budget={} sat, immediate={}",
            self.budget.to_sat(),
            self.immediate
        )?;

        match self.deadline_height {
            Some(height) => write!(f, ", deadline={}", height)?,
            None => write!(f, ", deadline=none")?,
        }

        match self.starting_fee_rate {
            Some(rate) => write!(f, ", starting_fee_rate={} sat/kwu", rate.to_sat_per_kwu()),
            None => write!(f, ", starting_fee_rate=none"),
        }
    }
}

/// A [`SpendableInput`] together with its [`Params`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SweeperInput {
    /// The input itself
    pub input: SpendableInput,
    /// Economic parameters of the input
    pub params: Params,
}

impl SweeperInput {
    /// Create a new [`SweeperInput`]
    pub fn new(input: SpendableInput, params: Params) -> Self {
        SweeperInput { input, params }
    }

    /// Outpoint being spent
    pub fn outpoint(&self) -> OutPoint {
        self.input.outpoint
    }
}

impl fmt::Display for SweeperInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.input, self.params)
    }
}
