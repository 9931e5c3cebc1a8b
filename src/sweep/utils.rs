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

//! Utilities
//!
//! Fee arithmetic, dust limits and the conversion of wallet UTXOs into sweepable inputs.

use std::fmt::Write;

use bitcoin::{Amount, FeeRate, Script, SignedAmount, Weight};

use crate::error::Error;
use crate::types::{AddressType, SpendableInput, WalletUtxo};

use super::witness::WitnessType;

/// Size of a P2TR (and P2WSH) script pubkey: witness version, push opcode and 32 bytes program
pub const P2TR_SIZE: usize = 1 + 1 + 32;

// Fee rate used by the relay policy to compute dust thresholds, in sat/vbyte
const DUST_RELAY_FEE_SAT_PER_VB: u64 = 3;

// Size of the input spending an output: outpoint, script sig length, nSequence and a signature
// plus pubkey either in the witness (discounted) or in the script sig.
const WITNESS_SPEND_SIZE: u64 = 32 + 4 + 1 + (107 / 4) + 4;
const LEGACY_SPEND_SIZE: u64 = 32 + 4 + 1 + 107 + 4;

/// Helper to calculate varint size. `v` is the value the varint represents.
pub fn varint_size(v: usize) -> u64 {
    if v <= 0xfc {
        return 1;
    }
    if v <= 0xffff {
        return 3;
    }
    if v <= 0xffff_ffff {
        return 5;
    }

    9
}

/// Fee for `weight` at `fee_rate`, rounded down
pub fn fee_for_weight(fee_rate: FeeRate, weight: Weight) -> Amount {
    Amount::from_sat(
        fee_rate
            .to_sat_per_kwu()
            .saturating_mul(weight.to_wu())
            / 1000,
    )
}

/// Dust limit of an output whose script is `script_len` bytes long
///
/// The output is dust if spending it costs more than a third of its value at the dust relay fee.
pub fn dust_limit_for_size(script_len: usize, witness_program: bool) -> Amount {
    let output_size = 8 + varint_size(script_len) + script_len as u64;
    let spend_size = if witness_program {
        WITNESS_SPEND_SIZE
    } else {
        LEGACY_SPEND_SIZE
    };

    Amount::from_sat((output_size + spend_size) * DUST_RELAY_FEE_SAT_PER_VB)
}

/// Dust limit of an output paying to `script`
pub fn dust_limit(script: &Script) -> Amount {
    dust_limit_for_size(script.len(), script.is_witness_program())
}

/// Dust limit of the change output, which is always modeled as a P2TR output
pub fn change_dust_limit() -> Amount {
    dust_limit_for_size(P2TR_SIZE, true)
}

/// Trait to check if a value is below the dust limit.
// We implement this trait to make sure we don't mess up the comparison with off-by-one like a <
// instead of a <= etc.
pub trait IsDust {
    /// Check whether or not a value is below dust limit
    fn is_dust(&self, script: &Script) -> bool;
}

impl IsDust for Amount {
    fn is_dust(&self, script: &Script) -> bool {
        *self < dust_limit(script)
    }
}

impl IsDust for SignedAmount {
    fn is_dust(&self, script: &Script) -> bool {
        *self < to_signed(dust_limit(script))
    }
}

pub(crate) fn to_signed(amount: Amount) -> SignedAmount {
    SignedAmount::from_sat(amount.to_sat().min(i64::MAX as u64) as i64)
}

pub(crate) fn to_unsigned_or_zero(amount: SignedAmount) -> Amount {
    if amount.is_negative() {
        Amount::ZERO
    } else {
        Amount::from_sat(amount.to_sat() as u64)
    }
}

/// Converts a wallet UTXO into an input that can be swept together with the other inputs
pub fn create_wallet_tx_input(utxo: &WalletUtxo) -> Result<SpendableInput, Error> {
    let witness_type = match utxo.address_type {
        AddressType::WitnessPubKey => WitnessType::WitnessKeyHash,
        AddressType::NestedWitnessPubKey => WitnessType::NestedWitnessKeyHash,
        AddressType::TaprootPubkey => WitnessType::TaprootPubKeySpend,
        other => return Err(Error::UnknownAddressType(other)),
    };

    Ok(SpendableInput::new(
        utxo.outpoint,
        utxo.txout.clone(),
        witness_type,
    ))
}

/// One line summary of `inputs` for log messages
pub fn input_type_summary<'a, I>(inputs: I) -> String
where
    I: IntoIterator<Item = &'a SpendableInput>,
{
    let mut summary = String::new();
    for (i, input) in inputs.into_iter().enumerate() {
        if i > 0 {
            summary.push_str(", ");
        }
        let _ = write!(summary, "{}", input);
    }

    summary
}
