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

// Helpers shared by the unit tests

use bitcoin::hashes::Hash;
use bitcoin::{Amount, OutPoint, ScriptBuf, TxOut, Txid};

use crate::sweep::witness::WitnessType;
use crate::types::{AddressType, Params, SpendableInput, SweeperInput, WalletUtxo};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn outpoint(n: u8) -> OutPoint {
    OutPoint {
        txid: Txid::from_byte_array([n; 32]),
        vout: n as u32,
    }
}

pub fn p2wpkh_script() -> ScriptBuf {
    let mut bytes = vec![0x00, 0x14];
    bytes.extend_from_slice(&[0xab; 20]);
    ScriptBuf::from_bytes(bytes)
}

pub fn p2wsh_script() -> ScriptBuf {
    let mut bytes = vec![0x00, 0x20];
    bytes.extend_from_slice(&[0xcd; 32]);
    ScriptBuf::from_bytes(bytes)
}

pub fn p2tr_script() -> ScriptBuf {
    let mut bytes = vec![0x51, 0x20];
    bytes.extend_from_slice(&[0xef; 32]);
    ScriptBuf::from_bytes(bytes)
}

pub fn txout(value: u64) -> TxOut {
    TxOut {
        value: Amount::from_sat(value),
        script_pubkey: p2wpkh_script(),
    }
}

pub fn input(n: u8, value: u64, witness_type: WitnessType) -> SpendableInput {
    SpendableInput::new(outpoint(n), txout(value), witness_type)
}

pub fn wpkh_input(n: u8, value: u64) -> SpendableInput {
    input(n, value, WitnessType::WitnessKeyHash)
}

/// A second level HTLC input that has to pay `required` to a P2WSH output.
pub fn htlc_input(n: u8, value: u64, required: u64) -> SpendableInput {
    input(n, value, WitnessType::HtlcSecondLevelSuccessAnchor).with_required_output(TxOut {
        value: Amount::from_sat(required),
        script_pubkey: p2wsh_script(),
    })
}

pub fn sweeper_input(input: SpendableInput, budget: u64, deadline: Option<u32>) -> SweeperInput {
    SweeperInput::new(
        input,
        Params {
            budget: Amount::from_sat(budget),
            deadline_height: deadline,
            ..Default::default()
        },
    )
}

pub fn wallet_utxo(n: u8, value: u64, address_type: AddressType) -> WalletUtxo {
    let script_pubkey = match address_type {
        AddressType::TaprootPubkey => p2tr_script(),
        _ => p2wpkh_script(),
    };

    WalletUtxo {
        outpoint: outpoint(n),
        txout: TxOut {
            value: Amount::from_sat(value),
            script_pubkey,
        },
        address_type,
    }
}
