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

use bitcoin::OutPoint;

use crate::sweep::witness::WitnessType;
use crate::types::AddressType;

/// Errors that can be thrown while building an [`InputSet`](crate::sweep::InputSet)
#[derive(Debug)]
pub enum Error {
    /// Generic error, usually coming from a [`Wallet`](crate::wallet::Wallet) back-end
    Generic(String),
    /// Cannot build a budget input set without inputs
    EmptyInputs,
    /// The same outpoint was supplied more than once
    DuplicateInputs(OutPoint),
    /// An input declares a deadline that differs from the one of the set
    DeadlineMismatch {
        /// Deadline height of the set
        expected: u32,
        /// Deadline height declared by the input
        found: u32,
    },
    /// There are not enough wallet inputs to reach a non-dust output or to cover the budget
    NotEnoughInputs,
    /// The wallet returned a UTXO whose address type can't be swept
    UnknownAddressType(AddressType),
    /// The weight of the witness for this input type can't be estimated
    UnsupportedWitnessType(WitnessType),
    /// Invalid input set configuration
    InvalidConfig(String),
    /// Error serializing or deserializing JSON data
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic(err) => write!(f, "Generic error: {}", err),
            Self::EmptyInputs => write!(f, "Inputs slice is empty"),
            Self::DuplicateInputs(outpoint) => write!(f, "Duplicate inputs: {}", outpoint),
            Self::DeadlineMismatch { expected, found } => write!(
                f,
                "Input deadline height not matched: want {}, got {}",
                expected, found
            ),
            Self::NotEnoughInputs => write!(f, "Not enough inputs"),
            Self::UnknownAddressType(address_type) => {
                write!(f, "Unknown address type: {:?}", address_type)
            }
            Self::UnsupportedWitnessType(witness_type) => {
                write!(f, "Unsupported witness type: {}", witness_type)
            }
            Self::InvalidConfig(err) => write!(f, "Invalid config: {}", err),
            Self::Json(err) => write!(f, "Serialize/Deserialize JSON error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

macro_rules! impl_error {
    ( $from:ty, $to:ident ) => {
        impl_error!($from, $to, Error);
    };
    ( $from:ty, $to:ident, $impl_for:ty ) => {
        impl std::convert::From<$from> for $impl_for {
            fn from(err: $from) -> Self {
                <$impl_for>::$to(err)
            }
        }
    };
}

impl_error!(serde_json::Error, Json);
