// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use std::fs::read_to_string;
use std::io::{Error as IoError, ErrorKind as IoErrorKind, Result as IoResult};
use std::path::Path;

use clap::ValueEnum;
use dma_burst::burst_test::{BurstParams, DEFAULT_BURST_SIZE, DEFAULT_POLL_BUDGET};
use dma_burst::bus::StallPatternParseError;
use dma_burst::sram::ADC_SRAM_BASE;
use dma_burst::{StallPattern, ZeroSizePolicy};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ZeroSize {
    /// Write nothing and stay idle.
    #[default]
    Skip,
    /// Write a single word.
    Single,
}

impl From<ZeroSize> for ZeroSizePolicy {
    fn from(zero_size: ZeroSize) -> Self {
        match zero_size {
            ZeroSize::Skip => ZeroSizePolicy::Skip,
            ZeroSize::Single => ZeroSizePolicy::SingleWord,
        }
    }
}

/// Simulation settings, loaded from a JSON file. Missing fields take their
/// default value.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub burst_size: u16,
    pub base: u32,
    pub offset: u32,
    pub passes: u32,
    /// Backpressure applied by the SRAM, e.g. `fixed:2` or `random:3:42`.
    pub stall: String,
    pub poll_budget: u64,
    pub zero_size: ZeroSize,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            burst_size: DEFAULT_BURST_SIZE,
            base: ADC_SRAM_BASE,
            offset: 0,
            passes: 1,
            stall: "never".to_string(),
            poll_budget: DEFAULT_POLL_BUDGET,
            zero_size: ZeroSize::default(),
        }
    }
}

impl SimConfig {
    /// Load the config at `path`, or the defaults if there is none.
    pub fn load(path: Option<&Path>) -> IoResult<Self> {
        match path {
            Some(path) => Ok(serde_json::from_str(&read_to_string(path)?)?),
            None => Ok(SimConfig::default()),
        }
    }

    /// Reject settings the simulation cannot run with.
    pub fn check(&self) -> IoResult<()> {
        if self.poll_budget == 0 {
            return Err(other_io_error!("poll_budget must be at least 1 cycle"));
        }
        Ok(())
    }

    pub fn params(&self) -> BurstParams {
        BurstParams {
            burst_size: self.burst_size,
            base_address: self.base,
            address_offset: self.offset,
        }
    }

    pub fn stall_pattern(&self) -> Result<StallPattern, StallPatternParseError> {
        self.stall.parse()
    }
}
