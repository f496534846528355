// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! The burst-write state machine.
//!
//! ```text
//!            start pulse
//!   +------+ ----------> +--------+
//!   | Idle |             | Active | --+ write stalled / accepted, not last
//!   +------+ <---------- +--------+ <-+
//!            last write accepted
//! ```
//!
//! In `Idle` the engine asserts `ready` and waits for a start pulse. The pulse
//! latches the burst size and target address, so reconfiguring the registers
//! during a burst only affects the next one. In `Active` the engine offers
//! one write per cycle and only moves on to the next word once the bus has
//! accepted the current one. After the last word it bumps the pass counter
//! and returns to `Idle`.
//!
//! A pulse that arrives while `Active` is consumed and dropped; it is not
//! queued for the next burst.

use log::{debug, info, trace, warn};
use ufmt::derive::uDebug;

use crate::bus::{BusWriter, WriteRequest};
use crate::registers::{ConfigRegisters, RegisterBank, StatusRegisters, WORD_SHIFT};
use crate::unsigned::{PassCount, WordAddress};

#[derive(Copy, Clone, Debug, PartialEq, Eq, uDebug)]
pub enum State {
    Idle,
    Active,
}

/// What to do with a start pulse while `burst_size` is zero.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, uDebug)]
pub enum ZeroSizePolicy {
    /// Consume the pulse, write nothing and stay idle. The pass counter is
    /// not bumped, as no burst completed.
    #[default]
    Skip,
    /// Run the burst as if `burst_size` were 1.
    SingleWord,
}

/// Result of a single [`BurstEngine::step`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, uDebug)]
pub enum StepOutcome {
    /// Waiting for a start pulse.
    Idle,
    /// A start pulse was seen and the configuration latched.
    Started { burst_size: u16 },
    /// A start pulse was seen with `burst_size == 0` and skipped.
    EmptyBurst,
    /// The bus did not accept the offered write.
    Stalled(WriteRequest),
    /// The bus accepted a write, more words follow.
    Accepted(WriteRequest),
    /// The bus accepted the last write of the burst.
    Completed {
        request: WriteRequest,
        pass_count: PassCount,
    },
}

impl StepOutcome {
    /// The write the bus accepted in this step, if any.
    pub fn accepted_write(&self) -> Option<WriteRequest> {
        match *self {
            StepOutcome::Accepted(request) | StepOutcome::Completed { request, .. } => {
                Some(request)
            }
            _ => None,
        }
    }
}

/// Configuration latched at the start of a burst.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct LatchedBurst {
    size: u16,
    start: WordAddress,
}

impl LatchedBurst {
    fn from_config(config: &ConfigRegisters, size: u16) -> Self {
        let base = WordAddress::truncate(config.base_address >> WORD_SHIFT);
        let offset = WordAddress::truncate(config.address_offset >> WORD_SHIFT);
        LatchedBurst {
            size,
            start: base.wrapping_add(offset),
        }
    }
}

/// The DMA burst-write engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurstEngine {
    state: State,
    words_written: u16,
    pass_count: PassCount,
    burst: LatchedBurst,
    zero_size_policy: ZeroSizePolicy,
}

impl Default for BurstEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BurstEngine {
    pub fn new() -> Self {
        Self::with_zero_size_policy(ZeroSizePolicy::default())
    }

    pub fn with_zero_size_policy(zero_size_policy: ZeroSizePolicy) -> Self {
        BurstEngine {
            state: State::Idle,
            words_written: 0,
            pass_count: PassCount::min_val(),
            burst: LatchedBurst::default(),
            zero_size_policy,
        }
    }

    /// Return to the reset state. The zero size policy is kept.
    pub fn reset(&mut self) {
        *self = Self::with_zero_size_policy(self.zero_size_policy);
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == State::Idle
    }

    /// Words of the current burst accepted by the bus so far.
    pub fn words_written(&self) -> u16 {
        self.words_written
    }

    pub fn pass_count(&self) -> PassCount {
        self.pass_count
    }

    pub fn zero_size_policy(&self) -> ZeroSizePolicy {
        self.zero_size_policy
    }

    /// Size of the running burst, `None` while idle.
    pub fn latched_burst_size(&self) -> Option<u16> {
        match self.state {
            State::Idle => None,
            State::Active => Some(self.burst.size),
        }
    }

    /// The write offered to the bus in the next step, `None` while idle.
    pub fn current_request(&self) -> Option<WriteRequest> {
        match self.state {
            State::Idle => None,
            State::Active => Some(self.request()),
        }
    }

    /// Every word of a burst carries the pass count as payload.
    fn request(&self) -> WriteRequest {
        WriteRequest {
            address: self.burst.start.wrapping_add_u32(self.words_written as u32),
            data: self.pass_count.into_underlying(),
        }
    }

    fn status(&self) -> StatusRegisters {
        StatusRegisters {
            ready: self.is_ready(),
            pass_count: self.pass_count,
        }
    }

    /// Advance the engine by one clock cycle.
    ///
    /// Samples the start trigger of `bank`, offers at most one write to
    /// `bus`, and publishes `ready` and `pass_count` back to `bank`.
    pub fn step<B: BusWriter + ?Sized>(
        &mut self,
        bank: &mut RegisterBank,
        bus: &mut B,
    ) -> StepOutcome {
        let triggered = bank.sample_trigger();

        let outcome = match self.state {
            State::Idle => {
                self.words_written = 0;
                if triggered {
                    self.start(bank.config())
                } else {
                    StepOutcome::Idle
                }
            }
            State::Active => {
                if triggered {
                    trace!("Dropping start pulse, burst in progress");
                }
                self.write_word(bus)
            }
        };

        bank.publish_status(self.status());
        outcome
    }

    fn start(&mut self, config: &ConfigRegisters) -> StepOutcome {
        let size = match (config.burst_size, self.zero_size_policy) {
            (0, ZeroSizePolicy::Skip) => {
                warn!("Start pulse with burst size 0, nothing to write");
                return StepOutcome::EmptyBurst;
            }
            (0, ZeroSizePolicy::SingleWord) => 1,
            (size, _) => size,
        };

        self.burst = LatchedBurst::from_config(config, size);
        self.state = State::Active;
        debug!(
            "Starting burst {} of {} words at word address {:#x}",
            self.pass_count, size, self.burst.start
        );
        StepOutcome::Started { burst_size: size }
    }

    fn write_word<B: BusWriter + ?Sized>(&mut self, bus: &mut B) -> StepOutcome {
        let request = self.request();

        if !bus.offer(request) {
            return StepOutcome::Stalled(request);
        }

        trace!("Wrote {:#x} to word address {:#x}", request.data, request.address);

        if self.words_written == self.burst.size - 1 {
            self.pass_count = self.pass_count.wrapping_increment();
            self.words_written = 0;
            self.state = State::Idle;
            info!(
                "Burst of {} words done, pass count {}",
                self.burst.size, self.pass_count
            );
            StepOutcome::Completed {
                request,
                pass_count: self.pass_count,
            }
        } else {
            self.words_written += 1;
            StepOutcome::Accepted(request)
        }
    }
}
