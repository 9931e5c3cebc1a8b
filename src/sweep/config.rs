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

//! Input set configuration
//!
//! Limits applied to a [`TxInputSet`](super::TxInputSet), loadable from JSON.

use bitcoin::FeeRate;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default cap on the number of inputs of a sweep
pub const DEFAULT_MAX_INPUTS: u32 = 100;

/// Default max fee rate, 1000 sat/vbyte
pub const DEFAULT_MAX_FEE_RATE_SAT_PER_KWU: u64 = 250_000;

/// Configuration of a [`TxInputSet`](super::TxInputSet)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct InputSetConfig {
    /// Maximum number of inputs, not counting wallet inputs
    pub max_inputs: u32,
    /// Fee rate the sweep never exceeds, in sat/kwu
    pub max_fee_rate_sat_per_kwu: u64,
}

impl Default for InputSetConfig {
    fn default() -> Self {
        InputSetConfig {
            max_inputs: DEFAULT_MAX_INPUTS,
            max_fee_rate_sat_per_kwu: DEFAULT_MAX_FEE_RATE_SAT_PER_KWU,
        }
    }
}

impl InputSetConfig {
    /// Parse and validate a JSON configuration. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: InputSetConfig = serde_json::from_str(json)?;
        config.validate()?;

        Ok(config)
    }

    /// Check that the configuration can be used to build an input set
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_inputs == 0 {
            return Err(Error::InvalidConfig(
                "max_inputs must be greater than zero".to_string(),
            ));
        }
        if self.max_fee_rate_sat_per_kwu == 0 {
            return Err(Error::InvalidConfig(
                "max_fee_rate_sat_per_kwu must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Max fee rate as a [`FeeRate`]
    pub fn max_fee_rate(&self) -> FeeRate {
        FeeRate::from_sat_per_kwu(self.max_fee_rate_sat_per_kwu)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InputSetConfig::default();
        assert_eq!(config.max_inputs, 100);
        assert_eq!(config.max_fee_rate(), FeeRate::from_sat_per_vb_unchecked(1_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config = InputSetConfig::from_json(r#"{"max_inputs": 10}"#).unwrap();
        assert_eq!(config.max_inputs, 10);
        assert_eq!(
            config.max_fee_rate_sat_per_kwu,
            DEFAULT_MAX_FEE_RATE_SAT_PER_KWU
        );
    }

    #[test]
    fn test_config_from_json_invalid() {
        assert!(matches!(
            InputSetConfig::from_json(r#"{"max_inputs": 0}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            InputSetConfig::from_json(r#"{"max_inputs": "ten"}"#),
            Err(Error::Json(_))
        ));
    }
}
