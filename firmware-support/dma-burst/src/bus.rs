// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Write-only bus interface driven by the burst engine.
//!
//! The engine offers one [`WriteRequest`] per cycle. The target answers with
//! `true` when it accepted the write in that cycle. Until then the engine
//! offers the identical request again on every cycle. A target that never
//! accepts stalls the engine forever; there is no timeout on this side of
//! the handshake.

use core::fmt;
use core::str::FromStr;

use heapless::Vec;
use log::{trace, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use ufmt::derive::uDebug;

use crate::unsigned::WordAddress;

/// Maximum number of entries in a [`StallPattern::Script`].
pub const MAX_STALL_SCRIPT: usize = 32;

/// A single word write offered to the bus.
#[derive(Copy, Clone, Debug, PartialEq, Eq, uDebug)]
pub struct WriteRequest {
    pub address: WordAddress,
    pub data: u32,
}

impl WriteRequest {
    /// Byte address corresponding to the word address.
    pub fn byte_address(&self) -> u32 {
        self.address.into_underlying() << crate::registers::WORD_SHIFT
    }
}

/// A bus target that accepts word writes with a valid/ready handshake.
pub trait BusWriter {
    /// Offer `request` for this cycle. Returns whether it was accepted.
    fn offer(&mut self, request: WriteRequest) -> bool;
}

impl<B: BusWriter + ?Sized> BusWriter for &mut B {
    fn offer(&mut self, request: WriteRequest) -> bool {
        (**self).offer(request)
    }
}

/// Targets whose contents can be inspected after a burst.
pub trait MemoryReadback {
    /// Read the word stored at `address`, or `None` if the target does not
    /// back that address.
    fn read_word(&self, address: WordAddress) -> Option<u32>;
}

impl<M: MemoryReadback + ?Sized> MemoryReadback for &M {
    fn read_word(&self, address: WordAddress) -> Option<u32> {
        (**self).read_word(address)
    }
}

impl<M: MemoryReadback + ?Sized> MemoryReadback for &mut M {
    fn read_word(&self, address: WordAddress) -> Option<u32> {
        (**self).read_word(address)
    }
}

/// How many cycles a [`Backpressure`] target withholds acceptance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StallPattern {
    /// Accept every write in the cycle it is offered.
    #[default]
    Never,
    /// Stall every write for the given number of cycles.
    Fixed(u32),
    /// Stall the `i`-th write of the target's lifetime for `script[i]`
    /// cycles. Writes past the end of the script are not stalled.
    Script(Vec<u32, MAX_STALL_SCRIPT>),
    /// Stall every write for a pseudo-random `0..=max_stall` cycles.
    Random { max_stall: u32, seed: u64 },
    /// Never accept anything.
    Forever,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, uDebug)]
pub enum StallPatternParseError {
    UnknownPattern,
    MissingArgument,
    InvalidNumber,
    ScriptTooLong,
}

impl fmt::Display for StallPatternParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            StallPatternParseError::UnknownPattern => {
                "unknown stall pattern, expected never, fixed:N, script:A,B,..., random:MAX:SEED or forever"
            }
            StallPatternParseError::MissingArgument => "stall pattern is missing an argument",
            StallPatternParseError::InvalidNumber => "stall pattern argument is not a number",
            StallPatternParseError::ScriptTooLong => "stall script has too many entries",
        };
        f.write_str(msg)
    }
}

impl FromStr for StallPattern {
    type Err = StallPatternParseError;

    /// Parse `never`, `fixed:N`, `script:A,B,C`, `random:MAX:SEED` or
    /// `forever`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(2, ':');
        let kind = parts.next().unwrap_or_default();
        let args = parts.next();

        let number = |s: &str| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| StallPatternParseError::InvalidNumber)
        };

        match (kind, args) {
            ("never", None) => Ok(StallPattern::Never),
            ("forever", None) => Ok(StallPattern::Forever),
            ("fixed", Some(n)) => Ok(StallPattern::Fixed(number(n)?)),
            ("script", Some(list)) => {
                let mut script = Vec::new();
                for entry in list.split(',') {
                    script
                        .push(number(entry)?)
                        .map_err(|_| StallPatternParseError::ScriptTooLong)?;
                }
                Ok(StallPattern::Script(script))
            }
            ("random", Some(args)) => {
                let (max_stall, seed) = args
                    .split_once(':')
                    .ok_or(StallPatternParseError::MissingArgument)?;
                let seed = seed
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| StallPatternParseError::InvalidNumber)?;
                Ok(StallPattern::Random {
                    max_stall: number(max_stall)?,
                    seed,
                })
            }
            ("fixed" | "script" | "random", None) => Err(StallPatternParseError::MissingArgument),
            _ => Err(StallPatternParseError::UnknownPattern),
        }
    }
}

impl fmt::Display for StallPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StallPattern::Never => write!(f, "never"),
            StallPattern::Fixed(n) => write!(f, "fixed:{n}"),
            StallPattern::Script(script) => {
                write!(f, "script:")?;
                for (i, n) in script.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{n}")?;
                }
                Ok(())
            }
            StallPattern::Random { max_stall, seed } => write!(f, "random:{max_stall}:{seed}"),
            StallPattern::Forever => write!(f, "forever"),
        }
    }
}

/// Wraps a bus target and withholds acceptance according to a
/// [`StallPattern`].
///
/// Also checks the handshake from the target's side: once a request has been
/// stalled, the next offer must carry the identical request. Offers that
/// differ are counted in [`Backpressure::handshake_violations`].
pub struct Backpressure<B> {
    inner: B,
    pattern: StallPattern,
    rng: SmallRng,
    /// Stall cycles left for the pending request, `None` if nothing pending.
    remaining: Option<u32>,
    pending: Option<WriteRequest>,
    accepted: u32,
    stall_cycles: u64,
    violations: u32,
}

impl<B: BusWriter> Backpressure<B> {
    pub fn new(inner: B, pattern: StallPattern) -> Self {
        let seed = match pattern {
            StallPattern::Random { seed, .. } => seed,
            _ => 0,
        };
        Self {
            inner,
            pattern,
            rng: SmallRng::seed_from_u64(seed),
            remaining: None,
            pending: None,
            accepted: 0,
            stall_cycles: 0,
            violations: 0,
        }
    }

    pub fn pattern(&self) -> &StallPattern {
        &self.pattern
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    /// Number of writes accepted through this adaptor.
    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    /// Total cycles in which an offered request was not accepted.
    pub fn stall_cycles(&self) -> u64 {
        self.stall_cycles
    }

    /// Offers that did not repeat a still-pending request.
    pub fn handshake_violations(&self) -> u32 {
        self.violations
    }

    fn stalls_for_next_write(&mut self) -> Option<u32> {
        match &self.pattern {
            StallPattern::Never => Some(0),
            StallPattern::Random { max_stall, .. } => Some(self.rng.gen_range(0..=*max_stall)),
            StallPattern::Fixed(n) => Some(*n),
            StallPattern::Script(script) => {
                Some(script.get(self.accepted as usize).copied().unwrap_or(0))
            }
            StallPattern::Forever => None,
        }
    }
}

impl<B: BusWriter> BusWriter for Backpressure<B> {
    fn offer(&mut self, request: WriteRequest) -> bool {
        if let Some(pending) = self.pending {
            if pending != request {
                warn!(
                    "Request changed while stalled: {:?} replaced {:?}",
                    request, pending
                );
                self.violations += 1;
            }
        }

        let remaining = match self.remaining {
            Some(n) => Some(n),
            None => self.stalls_for_next_write(),
        };

        match remaining {
            Some(0) => {}
            Some(n) => {
                trace!("Stalling write to {:#x}, {} cycles left", request.address, n);
                self.remaining = Some(n - 1);
                self.pending = Some(request);
                self.stall_cycles += 1;
                return false;
            }
            None => {
                self.pending = Some(request);
                self.stall_cycles += 1;
                return false;
            }
        }

        if self.inner.offer(request) {
            self.accepted += 1;
            self.remaining = None;
            self.pending = None;
            true
        } else {
            self.remaining = Some(0);
            self.pending = Some(request);
            self.stall_cycles += 1;
            false
        }
    }
}

impl<B: MemoryReadback> MemoryReadback for Backpressure<B> {
    fn read_word(&self, address: WordAddress) -> Option<u32> {
        self.inner.read_word(address)
    }
}
