// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Cycle-stepped model of the Wishbone DMA burst-write test engine.
//!
//! A [`soc::DmaBurstSoc`] ties together a [`registers::RegisterBank`], a
//! [`engine::BurstEngine`] and a [`bus::BusWriter`] target and advances them
//! in lockstep, one clock cycle per call to [`soc::DmaBurstSoc::step`].
//! [`burst_test`] contains the firmware side of the test: configure, pulse
//! `start`, poll `ready` and read the target memory back.

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod engine;
pub mod registers;
pub mod soc;
pub mod sram;
pub mod unsigned;

pub use bus::{Backpressure, BusWriter, MemoryReadback, StallPattern, WriteRequest};
pub use engine::{BurstEngine, State, StepOutcome, ZeroSizePolicy};
pub use registers::{Csr, RegisterBank};
pub use soc::DmaBurstSoc;
pub use sram::Sram;
pub use unsigned::{PassCount, Unsigned, WordAddress};
