// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Operand field layout.
//!
//! A field is a run of identical field characters. Scanning from the most
//! significant bit, a `0`, `1` or `-` closes the open run, and a different
//! field character closes it and opens the next one. Reusing a character
//! after a break therefore starts a new field.

use crate::error::PatternError;
use crate::opcode::Opcode;
use crate::pattern::{Pattern, Symbol};

/// Location of one operand field inside the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo<T> {
    /// Pattern character the run was written with.
    pub symbol: char,
    pub mask: T,
    /// Position of the run's least significant bit.
    pub shift: u32,
}

impl<T: Opcode> FieldInfo<T> {
    /// Number of bits in the field.
    #[inline]
    pub fn width(&self) -> u32 {
        self.mask.count_ones()
    }

    /// Raw, right-aligned field value.
    #[inline]
    pub fn extract(&self, word: T) -> u64 {
        ((word & self.mask) >> self.shift).to_u64()
    }
}

/// Walks field runs in order, calling `visit(index, symbol, position)` for
/// every field bit.
fn scan_runs<T: Opcode>(
    pattern: &Pattern<'_, T>,
    mut visit: impl FnMut(usize, char, u32) -> Result<(), PatternError>,
) -> Result<usize, PatternError> {
    let mut index = 0usize;
    let mut open: Option<char> = None;

    for (position, symbol) in pattern.symbols() {
        match symbol {
            Symbol::Zero | Symbol::One | Symbol::DontCare => {
                if open.take().is_some() {
                    index += 1;
                }
            }
            Symbol::Field(ch) => {
                match open {
                    None => open = Some(ch),
                    Some(current) if current != ch => {
                        open = Some(ch);
                        index += 1;
                    }
                    Some(_) => {}
                }
                visit(index, ch, position)?;
            }
        }
    }

    if open.is_some() {
        index += 1;
    }
    Ok(index)
}

/// Number of distinct field runs in the pattern.
pub fn count_field_runs<T: Opcode>(pattern: &Pattern<'_, T>) -> usize {
    scan_runs(pattern, |_, _, _| Ok(())).unwrap_or(0)
}

/// Builds the mask and shift of each of the `declared` fields.
///
/// Fails if the pattern holds more runs than `declared`, or if any declared
/// slot is never filled.
pub fn compile_fields<T: Opcode>(
    pattern: &Pattern<'_, T>,
    declared: usize,
) -> Result<Vec<FieldInfo<T>>, PatternError> {
    let mut fields = vec![
        FieldInfo {
            symbol: '\0',
            mask: T::ZERO,
            shift: 0,
        };
        declared
    ];

    let found = scan_runs(pattern, |index, symbol, position| {
        let field = fields.get_mut(index).ok_or(PatternError::FieldOverflow {
            position,
            declared,
        })?;
        field.symbol = symbol;
        field.mask = field.mask | T::bit(position);
        field.shift = position;
        Ok(())
    })?;

    if let Some(index) = fields.iter().position(|f| f.mask == T::ZERO) {
        return Err(PatternError::MissingField {
            index,
            declared,
            found,
        });
    }

    Ok(fields)
}
