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

//! Witness classification
//!
//! Every [`SpendableInput`](crate::SpendableInput) carries a [`WitnessType`], which tells the
//! weight estimator how large the witness spending it will be. All sizes are upper bounds in
//! bytes and include the length prefix of every witness element as well as the element count.

use std::fmt;

use crate::error::Error;

use super::weight::TxWeightEstimator;

/// Witness size of a P2WPKH spend: count, signature and compressed public key
pub const P2WKH_WITNESS_SIZE: u64 = 1 + 1 + 73 + 1 + 33;

/// Script sig of a P2WPKH nested in P2SH: push of the 22 bytes redeem script
pub const NESTED_P2WPKH_SCRIPT_SIG_SIZE: u64 = 1 + 22;

/// Witness size of a taproot key path spend with the default sighash
pub const TAPROOT_KEY_PATH_WITNESS_SIZE: u64 = 1 + 1 + 64;

/// Size of the `to_local` script of a commitment transaction
pub const TO_LOCAL_SCRIPT_SIZE: u64 = 79;

/// Size of the `to_remote` script of an anchor commitment, with its 1 block CSV
pub const TO_REMOTE_CONFIRMED_SCRIPT_SIZE: u64 = 37;

/// Size of an anchor output script
pub const ANCHOR_SCRIPT_SIZE: u64 = 40;

/// Size of an offered HTLC script on an anchor commitment
pub const OFFERED_HTLC_SCRIPT_SIZE: u64 = 136;

/// Size of an accepted HTLC script on an anchor commitment
pub const ACCEPTED_HTLC_SCRIPT_SIZE: u64 = 142;

/// Classification of the witness needed to spend an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WitnessType {
    /// Native P2WPKH wallet output
    WitnessKeyHash,
    /// P2WPKH nested in P2SH wallet output
    NestedWitnessKeyHash,
    /// Taproot key path spend of a wallet output
    TaprootPubKeySpend,
    /// Our delayed `to_local` output, spent after its CSV delay
    CommitmentTimeLock,
    /// The counterparty's `to_local` output, spent with the revocation key
    CommitmentRevoke,
    /// Legacy `to_remote` P2WPKH output
    CommitmentNoDelay,
    /// `to_remote` output of an anchor commitment, spendable after 1 confirmation
    CommitmentToRemoteConfirmed,
    /// Anchor output, usually spent to bump the commitment fee
    CommitmentAnchor,
    /// HTLC we offered on the remote commitment, spent after its timeout
    HtlcOfferedRemoteTimeout,
    /// HTLC we accepted on the remote commitment, spent with the preimage
    HtlcAcceptedRemoteSuccess,
    /// HTLC timeout on our own anchor commitment. Carries a required output.
    HtlcSecondLevelTimeoutAnchor,
    /// HTLC success on our own anchor commitment. Carries a required output.
    HtlcSecondLevelSuccessAnchor,
    /// A witness type this crate doesn't know how to size
    Unsupported(u16),
}

impl WitnessType {
    /// Upper bound of the witness size, `None` if it can't be estimated
    pub fn witness_size(&self) -> Option<u64> {
        let size = match self {
            WitnessType::WitnessKeyHash
            | WitnessType::NestedWitnessKeyHash
            | WitnessType::CommitmentNoDelay => P2WKH_WITNESS_SIZE,
            WitnessType::TaprootPubKeySpend => TAPROOT_KEY_PATH_WITNESS_SIZE,
            // sig, empty push, script
            WitnessType::CommitmentTimeLock => 1 + 1 + 73 + 1 + 1 + TO_LOCAL_SCRIPT_SIZE,
            // sig, OP_TRUE, script
            WitnessType::CommitmentRevoke => 1 + 1 + 73 + 1 + 1 + 1 + TO_LOCAL_SCRIPT_SIZE,
            WitnessType::CommitmentToRemoteConfirmed => {
                1 + 1 + 73 + 1 + TO_REMOTE_CONFIRMED_SCRIPT_SIZE
            }
            WitnessType::CommitmentAnchor => 1 + 1 + 73 + 1 + ANCHOR_SCRIPT_SIZE,
            // sig, empty push, script
            WitnessType::HtlcOfferedRemoteTimeout => 1 + 1 + 73 + 1 + 1 + ACCEPTED_HTLC_SCRIPT_SIZE,
            // sig, preimage, script
            WitnessType::HtlcAcceptedRemoteSuccess => {
                1 + 1 + 73 + 1 + 32 + 1 + OFFERED_HTLC_SCRIPT_SIZE
            }
            // multisig dummy, two sigs, empty push, script
            WitnessType::HtlcSecondLevelTimeoutAnchor => {
                1 + 1 + 1 + 73 + 1 + 73 + 1 + 1 + OFFERED_HTLC_SCRIPT_SIZE
            }
            // multisig dummy, two sigs, preimage, script
            WitnessType::HtlcSecondLevelSuccessAnchor => {
                1 + 1 + 1 + 73 + 1 + 73 + 1 + 32 + 1 + ACCEPTED_HTLC_SCRIPT_SIZE
            }
            WitnessType::Unsupported(_) => return None,
        };

        Some(size)
    }

    /// Add the weight of an input of this type to `estimator`
    pub fn add_weight_estimation(&self, estimator: &mut TxWeightEstimator) -> Result<(), Error> {
        match self {
            WitnessType::NestedWitnessKeyHash => {
                estimator.add_nested_p2wkh_input();
            }
            _ => {
                let witness_size = self
                    .witness_size()
                    .ok_or(Error::UnsupportedWitnessType(*self))?;
                estimator.add_witness_input(witness_size);
            }
        }

        Ok(())
    }
}

impl fmt::Display for WitnessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WitnessType::WitnessKeyHash => write!(f, "WitnessKeyHash"),
            WitnessType::NestedWitnessKeyHash => write!(f, "NestedWitnessKeyHash"),
            WitnessType::TaprootPubKeySpend => write!(f, "TaprootPubKeySpend"),
            WitnessType::CommitmentTimeLock => write!(f, "CommitmentTimeLock"),
            WitnessType::CommitmentRevoke => write!(f, "CommitmentRevoke"),
            WitnessType::CommitmentNoDelay => write!(f, "CommitmentNoDelay"),
            WitnessType::CommitmentToRemoteConfirmed => write!(f, "CommitmentToRemoteConfirmed"),
            WitnessType::CommitmentAnchor => write!(f, "CommitmentAnchor"),
            WitnessType::HtlcOfferedRemoteTimeout => write!(f, "HtlcOfferedRemoteTimeout"),
            WitnessType::HtlcAcceptedRemoteSuccess => write!(f, "HtlcAcceptedRemoteSuccess"),
            WitnessType::HtlcSecondLevelTimeoutAnchor => {
                write!(f, "HtlcSecondLevelTimeoutAnchor")
            }
            WitnessType::HtlcSecondLevelSuccessAnchor => {
                write!(f, "HtlcSecondLevelSuccessAnchor")
            }
            WitnessType::Unsupported(code) => write!(f, "Unsupported({})", code),
        }
    }
}
