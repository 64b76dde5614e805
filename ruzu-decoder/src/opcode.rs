// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;
use std::ops::{BitAnd, BitOr, Not, Shl, Shr};

/// A fixed-width instruction word.
pub trait Opcode:
    Copy
    + Eq
    + fmt::Debug
    + fmt::LowerHex
    + Send
    + Sync
    + 'static
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
{
    /// Width of the word in bits.
    const BITS: u32;
    const ZERO: Self;
    const ONE: Self;

    /// Word with only bit `position` set.
    #[inline]
    fn bit(position: u32) -> Self {
        Self::ONE << position
    }

    /// Zero-extend to 64 bits.
    fn to_u64(self) -> u64;

    /// Narrow from 64 bits, `None` if the value does not fit.
    fn from_u64(value: u64) -> Option<Self>;

    fn count_ones(self) -> u32;
}

macro_rules! impl_opcode {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Opcode for $ty {
                const BITS: u32 = <$ty>::BITS;
                const ZERO: Self = 0;
                const ONE: Self = 1;

                #[inline]
                fn to_u64(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn from_u64(value: u64) -> Option<Self> {
                    <$ty>::try_from(value).ok()
                }

                #[inline]
                fn count_ones(self) -> u32 {
                    <$ty>::count_ones(self)
                }
            }
        )*
    };
}

impl_opcode!(u8, u16, u32, u64);

/// Sign-extend the low `bits` bits of `value`.
#[inline]
pub fn sign_extend(value: u64, bits: u32) -> i64 {
    if bits == 0 || bits >= 64 {
        return value as i64;
    }
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}
