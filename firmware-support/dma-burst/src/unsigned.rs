// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width unsigned register values.
//!
//! Hardware registers and counters are narrower than the Rust integer that
//! carries them. [`Unsigned<BITS>`] keeps a `u32` masked to `BITS` bits, so a
//! write that is wider than the field truncates, and arithmetic wraps at the
//! field width instead of at 32 bits.

use core::fmt;

/// Rolling count of completed bursts, wraps modulo 32.
pub type PassCount = Unsigned<5>;

/// Wishbone word address: a 32-bit byte address shifted right by two.
pub type WordAddress = Unsigned<30>;

/// Unsigned integer representing `BITS` bits, `1 <= BITS <= 32`.
#[repr(transparent)]
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Unsigned<const BITS: u32>(u32);

impl<const BITS: u32> Unsigned<BITS> {
    /// Mask selecting the valid bits of the underlying `u32`.
    pub const MASK: u32 = {
        assert!(BITS > 0 && BITS <= 32, "Unsigned width must be 1..=32 bits");
        u32::MAX >> (32 - BITS)
    };

    /// Create a value, discarding all bits above `BITS`.
    pub const fn truncate(val: u32) -> Self {
        Unsigned(val & Self::MASK)
    }

    /// Create a value, or `None` if `val` does not fit in `BITS` bits.
    pub const fn checked_new(val: u32) -> Option<Self> {
        if val & !Self::MASK == 0 {
            Some(Unsigned(val))
        } else {
            None
        }
    }

    pub const fn min_val() -> Self {
        Unsigned(0)
    }

    pub const fn max_val() -> Self {
        Unsigned(Self::MASK)
    }

    pub const fn into_underlying(self) -> u32 {
        self.0
    }

    /// Addition modulo `2^BITS`.
    pub const fn wrapping_add(self, rhs: Self) -> Self {
        Self::truncate(self.0.wrapping_add(rhs.0))
    }

    /// Addition of a plain integer modulo `2^BITS`. Only the low `BITS` bits
    /// of `rhs` contribute.
    pub const fn wrapping_add_u32(self, rhs: u32) -> Self {
        Self::truncate(self.0.wrapping_add(rhs))
    }

    /// Subtraction modulo `2^BITS`.
    pub const fn wrapping_sub(self, rhs: Self) -> Self {
        Self::truncate(self.0.wrapping_sub(rhs.0))
    }

    /// Equivalent to `self.wrapping_add_u32(1)`.
    pub const fn wrapping_increment(self) -> Self {
        self.wrapping_add_u32(1)
    }
}

impl<const BITS: u32> From<Unsigned<BITS>> for u32 {
    fn from(val: Unsigned<BITS>) -> u32 {
        val.0
    }
}

impl<const BITS: u32> fmt::Debug for Unsigned<BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl<const BITS: u32> fmt::Display for Unsigned<BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<const BITS: u32> fmt::LowerHex for Unsigned<BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl<const BITS: u32> ufmt::uDebug for Unsigned<BITS> {
    fn fmt<W>(&self, formatter: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        ufmt::uDebug::fmt(&self.0, formatter)
    }
}

impl<const BITS: u32> ufmt::uDisplay for Unsigned<BITS> {
    fn fmt<W>(&self, formatter: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        ufmt::uDisplay::fmt(&self.0, formatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_match_width() {
        assert_eq!(Unsigned::<1>::MASK, 0b1);
        assert_eq!(PassCount::MASK, 0b1_1111);
        assert_eq!(WordAddress::MASK, 0x3fff_ffff);
        assert_eq!(Unsigned::<32>::MASK, u32::MAX);
    }

    #[test]
    fn new_works_with_bounds() {
        assert_eq!(PassCount::checked_new(31), Some(PassCount::max_val()));
        assert_eq!(PassCount::checked_new(32), None);
        assert_eq!(Unsigned::<32>::checked_new(u32::MAX), Some(Unsigned(u32::MAX)));
    }

    #[test]
    fn truncate_drops_high_bits() {
        assert_eq!(PassCount::truncate(33).into_underlying(), 1);
        assert_eq!(Unsigned::<16>::truncate(0x1_2345).into_underlying(), 0x2345);
        assert_eq!(WordAddress::truncate(u32::MAX), WordAddress::max_val());
    }

    #[test]
    fn wrapped_add_works() {
        let a = PassCount::truncate(30);
        assert_eq!(a.wrapping_increment(), PassCount::max_val());
        assert_eq!(a.wrapping_add(PassCount::truncate(2)), PassCount::min_val());
        assert_eq!(
            WordAddress::max_val().wrapping_add_u32(3),
            WordAddress::truncate(2)
        );
    }

    #[test]
    fn wrapping_sub_works() {
        assert_eq!(
            PassCount::min_val().wrapping_sub(PassCount::truncate(1)),
            PassCount::max_val()
        );
        assert_eq!(
            PassCount::truncate(9).wrapping_sub(PassCount::truncate(4)),
            PassCount::truncate(5)
        );
    }

    #[test]
    fn increment_cycles_through_all_values() {
        let mut x = PassCount::min_val();
        for expected in 1..=32u32 {
            x = x.wrapping_increment();
            assert_eq!(x.into_underlying(), expected % 32);
        }
    }
}
