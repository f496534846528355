// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Control/status register bank of the DMA burst engine.
//!
//! Ownership of the fields is split in two:
//! - [`ConfigRegisters`] and the start trigger are written by the controller
//!   (firmware or test harness) and only read by the engine.
//! - [`StatusRegisters`] are written by the engine and only read by the
//!   controller.
//!
//! The registers follow LiteX CSR ordering, one 32-bit word per register:
//!
//! | Offset | Register     | Access     | Reset |
//! |--------|--------------|------------|-------|
//! | `0x00` | `start`      | write-only | 0     |
//! | `0x04` | `ready`      | read-only  | 1     |
//! | `0x08` | `burst_size` | read/write | 0     |
//! | `0x0c` | `base`       | read/write | 0     |
//! | `0x10` | `offset`     | read/write | 0     |
//! | `0x14` | `pass_count` | read-only  | 0     |

use core::fmt;

use log::debug;
use ufmt::derive::uDebug;

use crate::unsigned::PassCount;

/// Byte-to-word address shift of the Wishbone bus (4 bytes per word).
pub const WORD_SHIFT: u32 = 2;

/// The `start_burst` field of the `start` register.
pub const START_BURST: u32 = 1 << 0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, uDebug)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

/// A register of the DMA burst engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, uDebug)]
pub enum Csr {
    Start,
    Ready,
    BurstSize,
    Base,
    Offset,
    PassCount,
}

impl Csr {
    pub const ALL: [Csr; 6] = [
        Csr::Start,
        Csr::Ready,
        Csr::BurstSize,
        Csr::Base,
        Csr::Offset,
        Csr::PassCount,
    ];

    /// Byte offset of the register relative to the bank's base address.
    pub const fn offset(self) -> u32 {
        match self {
            Csr::Start => 0x00,
            Csr::Ready => 0x04,
            Csr::BurstSize => 0x08,
            Csr::Base => 0x0c,
            Csr::Offset => 0x10,
            Csr::PassCount => 0x14,
        }
    }

    pub fn from_offset(offset: u32) -> Option<Csr> {
        Csr::ALL.into_iter().find(|csr| csr.offset() == offset)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Csr::Start => "start",
            Csr::Ready => "ready",
            Csr::BurstSize => "burst_size",
            Csr::Base => "base",
            Csr::Offset => "offset",
            Csr::PassCount => "pass_count",
        }
    }

    pub fn from_name(name: &str) -> Option<Csr> {
        Csr::ALL.into_iter().find(|csr| csr.name() == name)
    }

    pub const fn access(self) -> Access {
        match self {
            Csr::Start => Access::WriteOnly,
            Csr::Ready | Csr::PassCount => Access::ReadOnly,
            Csr::BurstSize | Csr::Base | Csr::Offset => Access::ReadWrite,
        }
    }

    /// Number of meaningful bits in the register.
    pub const fn width(self) -> u32 {
        match self {
            Csr::Start => 1,
            Csr::Ready => 8,
            Csr::BurstSize => 16,
            Csr::Base | Csr::Offset => 32,
            Csr::PassCount => 5,
        }
    }

    pub const fn reset_value(self) -> u32 {
        match self {
            Csr::Ready => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Csr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, uDebug)]
pub enum CsrError {
    UnknownRegister { offset: u32 },
}

impl fmt::Display for CsrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsrError::UnknownRegister { offset } => {
                write!(f, "no DMA burst register at offset 0x{offset:02x}")
            }
        }
    }
}

/// Registers written by the controller and read by the engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, uDebug)]
pub struct ConfigRegisters {
    /// Number of words written per burst.
    pub burst_size: u16,
    /// Byte address of the target region.
    pub base_address: u32,
    /// Byte offset added to `base_address`.
    pub address_offset: u32,
}

/// Registers written by the engine and read by the controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, uDebug)]
pub struct StatusRegisters {
    /// Engine is idle and will accept a trigger.
    pub ready: bool,
    /// Completed bursts since reset.
    pub pass_count: PassCount,
}

impl Default for StatusRegisters {
    fn default() -> Self {
        StatusRegisters {
            ready: true,
            pass_count: PassCount::min_val(),
        }
    }
}

/// Edge detector for the start request.
///
/// Two sources feed it: a write to the `start` CSR sets a one-shot strobe,
/// and [`RegisterBank::set_trigger_line`] drives a level. Either way a
/// request is seen at most once: the strobe clears when sampled, and the
/// level only counts on its rising edge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct TriggerLatch {
    strobe: bool,
    line: bool,
    sampled_line: bool,
}

impl TriggerLatch {
    fn sample(&mut self) -> bool {
        let rising = self.line && !self.sampled_line;
        let fired = self.strobe || rising;
        self.strobe = false;
        self.sampled_line = self.line;
        fired
    }
}

/// The DMA burst engine's register bank.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterBank {
    config: ConfigRegisters,
    status: StatusRegisters,
    trigger: TriggerLatch,
}

impl RegisterBank {
    /// Create a register bank holding the reset values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore all registers to their reset values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn config(&self) -> &ConfigRegisters {
        &self.config
    }

    pub fn status(&self) -> &StatusRegisters {
        &self.status
    }

    pub fn ready(&self) -> bool {
        self.status.ready
    }

    pub fn pass_count(&self) -> PassCount {
        self.status.pass_count
    }

    /// Request a burst. Equivalent to writing [`START_BURST`] to `start`.
    pub fn pulse_start(&mut self) {
        self.trigger.strobe = true;
    }

    /// Drive the level-sensitive start line. Holding it asserted starts at
    /// most one burst; it has to be released before it can trigger again.
    pub fn set_trigger_line(&mut self, asserted: bool) {
        self.trigger.line = asserted;
    }

    /// Set the burst size. Bits above the register's 16 bits are dropped.
    pub fn set_burst_size(&mut self, size: u32) {
        self.config.burst_size = size as u16;
    }

    pub fn set_base_address(&mut self, base_address: u32) {
        self.config.base_address = base_address;
    }

    pub fn set_address_offset(&mut self, address_offset: u32) {
        self.config.address_offset = address_offset;
    }

    /// Controller-side register write.
    ///
    /// Values wider than the register are truncated. Writes to read-only
    /// registers have no effect.
    pub fn write(&mut self, csr: Csr, value: u32) {
        match csr {
            Csr::Start => {
                if value & START_BURST != 0 {
                    self.pulse_start();
                }
            }
            Csr::BurstSize => self.set_burst_size(value),
            Csr::Base => self.set_base_address(value),
            Csr::Offset => self.set_address_offset(value),
            Csr::Ready | Csr::PassCount => {
                debug!("Ignoring write of {:#x} to read-only register {}", value, csr);
            }
        }
    }

    /// Controller-side register read. The write-only `start` reads as 0.
    pub fn read(&self, csr: Csr) -> u32 {
        match csr {
            Csr::Start => 0,
            Csr::Ready => self.status.ready as u32,
            Csr::BurstSize => self.config.burst_size as u32,
            Csr::Base => self.config.base_address,
            Csr::Offset => self.config.address_offset,
            Csr::PassCount => self.status.pass_count.into_underlying(),
        }
    }

    /// Register write by byte offset, as seen from the CPU's bus.
    pub fn write_offset(&mut self, offset: u32, value: u32) -> Result<(), CsrError> {
        let csr = Csr::from_offset(offset).ok_or(CsrError::UnknownRegister { offset })?;
        self.write(csr, value);
        Ok(())
    }

    /// Register read by byte offset, as seen from the CPU's bus.
    pub fn read_offset(&self, offset: u32) -> Result<u32, CsrError> {
        let csr = Csr::from_offset(offset).ok_or(CsrError::UnknownRegister { offset })?;
        Ok(self.read(csr))
    }

    /// Engine side: observe the start request for this cycle. Consumes it.
    pub(crate) fn sample_trigger(&mut self) -> bool {
        self.trigger.sample()
    }

    /// Engine side: update the status registers.
    pub(crate) fn publish_status(&mut self, status: StatusRegisters) {
        self.status = status;
    }
}
