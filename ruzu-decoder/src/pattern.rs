// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Encoding patterns and the fixed-bit compiler.
//!
//! A pattern is one symbol per opcode bit, most significant bit first:
//! `0`/`1` are fixed bits, `-` is a don't-care bit, and any other character
//! marks membership in an operand field.

use std::marker::PhantomData;

use crate::error::PatternError;
use crate::opcode::Opcode;

/// A pattern whose length has been checked against the opcode width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern<'a, T> {
    text: &'a str,
    _word: PhantomData<T>,
}

impl<'a, T: Opcode> Pattern<'a, T> {
    pub fn new(text: &'a str) -> Result<Self, PatternError> {
        let found = text.chars().count();
        if found != T::BITS as usize {
            return Err(PatternError::Length {
                expected: T::BITS,
                found,
            });
        }
        Ok(Self {
            text,
            _word: PhantomData,
        })
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Symbols paired with their bit position, MSB first.
    pub fn symbols(&self) -> impl Iterator<Item = (u32, Symbol)> + 'a {
        self.text
            .chars()
            .enumerate()
            .map(|(i, ch)| (T::BITS - 1 - i as u32, Symbol::from_char(ch)))
    }
}

/// Classification of one pattern character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Zero,
    One,
    DontCare,
    Field(char),
}

impl Symbol {
    pub fn from_char(ch: char) -> Self {
        match ch {
            '0' => Self::Zero,
            '1' => Self::One,
            '-' => Self::DontCare,
            other => Self::Field(other),
        }
    }
}

/// Fixed-bit mask and the value those bits must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskAndExpect<T> {
    pub mask: T,
    pub expect: T,
}

impl<T: Opcode> MaskAndExpect<T> {
    #[inline]
    pub fn matches(&self, word: T) -> bool {
        (word & self.mask) == self.expect
    }
}

/// '0' → mask bit set, expect bit clear.
/// '1' → mask bit set, expect bit set.
/// Anything else leaves both clear.
pub fn compile_match<T: Opcode>(pattern: &Pattern<'_, T>) -> MaskAndExpect<T> {
    let mut mask = T::ZERO;
    let mut expect = T::ZERO;
    for (position, symbol) in pattern.symbols() {
        match symbol {
            Symbol::Zero => {
                mask = mask | T::bit(position);
            }
            Symbol::One => {
                mask = mask | T::bit(position);
                expect = expect | T::bit(position);
            }
            Symbol::DontCare | Symbol::Field(_) => {}
        }
    }
    MaskAndExpect { mask, expect }
}
