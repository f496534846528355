// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use log::warn;

use crate::bus::{BusWriter, MemoryReadback, WriteRequest};
use crate::registers::WORD_SHIFT;
use crate::unsigned::WordAddress;

/// Byte address of the SRAM block dedicated to the DMA burst test.
pub const ADC_SRAM_BASE: u32 = 0x3000_0000;

/// Size of the DMA burst test SRAM in bytes.
pub const ADC_SRAM_SIZE: u32 = 8 * 4 * 4096;

/// Size of the DMA burst test SRAM in 32-bit words.
pub const ADC_SRAM_WORDS: usize = (ADC_SRAM_SIZE >> WORD_SHIFT) as usize;

/// Word-addressed memory that accepts every write in the cycle it is
/// offered.
///
/// Words are stored big-endian, the byte order of the DMA writer feeding it.
/// Writes outside of the memory are acknowledged and dropped, like a bus
/// decoder routing them to nowhere.
pub struct Sram<const WORDS: usize> {
    base: WordAddress,
    words: [[u8; 4]; WORDS],
    writes: u32,
    dropped: u32,
}

impl<const WORDS: usize> Sram<WORDS> {
    /// Create a zeroed memory starting at byte address `base_address`.
    /// The two least significant bits of `base_address` are ignored.
    pub fn new(base_address: u32) -> Self {
        Sram {
            base: WordAddress::truncate(base_address >> WORD_SHIFT),
            words: [[0; 4]; WORDS],
            writes: 0,
            dropped: 0,
        }
    }

    /// First byte address backed by this memory.
    pub fn base_address(&self) -> u32 {
        self.base.into_underlying() << WORD_SHIFT
    }

    pub const fn len_words(&self) -> usize {
        WORDS
    }

    /// Number of writes stored in memory.
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Number of accepted writes that fell outside of the memory.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    fn index(&self, address: WordAddress) -> Option<usize> {
        let index = address.into_underlying().checked_sub(self.base.into_underlying())? as usize;
        (index < WORDS).then_some(index)
    }

    /// Raw bytes of the word at `address`, in memory order.
    pub fn word_bytes(&self, address: WordAddress) -> Option<[u8; 4]> {
        self.index(address).map(|i| self.words[i])
    }

    /// Read the word at byte address `byte_address`.
    pub fn read_byte_address(&self, byte_address: u32) -> Option<u32> {
        self.read_word(WordAddress::truncate(byte_address >> WORD_SHIFT))
    }

    /// Zero the whole memory.
    pub fn clear(&mut self) {
        self.words = [[0; 4]; WORDS];
    }
}

impl<const WORDS: usize> BusWriter for Sram<WORDS> {
    fn offer(&mut self, request: WriteRequest) -> bool {
        match self.index(request.address) {
            Some(i) => {
                self.words[i] = request.data.to_be_bytes();
                self.writes += 1;
            }
            None => {
                warn!(
                    "Dropping write to {:#010x}, outside of SRAM at {:#010x}",
                    request.byte_address(),
                    self.base_address()
                );
                self.dropped += 1;
            }
        }
        true
    }
}

impl<const WORDS: usize> MemoryReadback for Sram<WORDS> {
    fn read_word(&self, address: WordAddress) -> Option<u32> {
        self.word_bytes(address).map(u32::from_be_bytes)
    }
}
