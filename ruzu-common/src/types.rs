// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

/// Instruction word width of a decode table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpcodeWidth {
    W8,
    W16,
    #[default]
    W32,
    W64,
}

impl OpcodeWidth {
    /// Width from a bit count; `None` for unsupported widths.
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Self::W8),
            16 => Some(Self::W16),
            32 => Some(Self::W32),
            64 => Some(Self::W64),
            _ => None,
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            Self::W8 => 8,
            Self::W16 => 16,
            Self::W32 => 32,
            Self::W64 => 64,
        }
    }
}
