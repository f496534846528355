// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use crate::bus::BusWriter;
use crate::engine::{BurstEngine, StepOutcome, ZeroSizePolicy};
use crate::registers::{Csr, CsrError, RegisterBank};

/// The DMA burst engine, its register bank and the bus target it writes to,
/// clocked together.
///
/// The controller side (firmware, a test, the simulator console) talks to the
/// engine through the `csr_*` methods only. Everything advances by one clock
/// cycle per [`DmaBurstSoc::step`].
pub struct DmaBurstSoc<B> {
    bank: RegisterBank,
    engine: BurstEngine,
    bus: B,
    cycle: u64,
}

impl<B: BusWriter> DmaBurstSoc<B> {
    pub fn new(bus: B) -> Self {
        Self::with_zero_size_policy(bus, ZeroSizePolicy::default())
    }

    pub fn with_zero_size_policy(bus: B, zero_size_policy: ZeroSizePolicy) -> Self {
        DmaBurstSoc {
            bank: RegisterBank::new(),
            engine: BurstEngine::with_zero_size_policy(zero_size_policy),
            bus,
            cycle: 0,
        }
    }

    /// Advance one clock cycle.
    pub fn step(&mut self) -> StepOutcome {
        let outcome = self.engine.step(&mut self.bank, &mut self.bus);
        self.cycle += 1;
        outcome
    }

    /// Advance `cycles` clock cycles.
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.step();
        }
    }

    /// Reset the engine and its registers. The bus target keeps its state,
    /// like memory across a CPU reboot.
    pub fn reset(&mut self) {
        self.bank.reset();
        self.engine.reset();
        self.cycle = 0;
    }

    pub fn csr_read(&self, csr: Csr) -> u32 {
        self.bank.read(csr)
    }

    pub fn csr_write(&mut self, csr: Csr, value: u32) {
        self.bank.write(csr, value)
    }

    pub fn csr_read_offset(&self, offset: u32) -> Result<u32, CsrError> {
        self.bank.read_offset(offset)
    }

    pub fn csr_write_offset(&mut self, offset: u32, value: u32) -> Result<(), CsrError> {
        self.bank.write_offset(offset, value)
    }

    /// Drive the level-sensitive start line.
    pub fn set_trigger_line(&mut self, asserted: bool) {
        self.bank.set_trigger_line(asserted)
    }

    /// Clock cycles since construction or the last reset.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn bank(&self) -> &RegisterBank {
        &self.bank
    }

    pub fn engine(&self) -> &BurstEngine {
        &self.engine
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }
}
