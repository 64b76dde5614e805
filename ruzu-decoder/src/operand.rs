// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Typed operand descriptors and the values handed to handlers.

use std::fmt;

use smallvec::SmallVec;

use crate::opcode::sign_extend;

/// Enumeration target: a type whose discriminants are `0..variants`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumSpec {
    pub name: &'static str,
    pub variants: u32,
}

/// Enum types that can be produced straight from a field.
pub trait FieldEnum: Sized {
    const NAME: &'static str;
    const VARIANTS: u32;

    /// Called with a value below `VARIANTS`.
    fn from_discriminant(value: u32) -> Self;
}

/// Declared type of one handler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    /// Two's-complement value sign-extended from the field's own width.
    Signed,
    Enum(EnumSpec),
}

impl FieldKind {
    pub fn enumeration<E: FieldEnum>() -> Self {
        Self::Enum(EnumSpec {
            name: E::NAME,
            variants: E::VARIANTS,
        })
    }

    /// Whether a field of `width` bits can be bound to this kind.
    ///
    /// Integer kinds take any width and truncate to the target, as an `as`
    /// cast does. Enumerations need a variant for every raw value.
    pub fn accepts_width(&self, width: u32) -> bool {
        match self {
            Self::Signed => width <= 64,
            Self::Enum(desc) => width < 32 && (1u64 << width) <= desc.variants as u64,
            _ => true,
        }
    }

    /// Convert a raw right-aligned field of `width` bits. Integer kinds keep
    /// the low bits of the target's width.
    #[inline]
    pub fn coerce(&self, raw: u64, width: u32) -> Operand {
        match self {
            Self::Bool => Operand::Bool(raw != 0),
            Self::U8 => Operand::U8(raw as u8),
            Self::U16 => Operand::U16(raw as u16),
            Self::U32 => Operand::U32(raw as u32),
            Self::U64 => Operand::U64(raw),
            Self::I8 => Operand::I8(raw as u8 as i8),
            Self::I16 => Operand::I16(raw as u16 as i16),
            Self::I32 => Operand::I32(raw as u32 as i32),
            Self::I64 => Operand::I64(raw as i64),
            Self::Signed => Operand::I64(sign_extend(raw, width)),
            Self::Enum(_) => Operand::Enum(raw as u32),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::Signed => write!(f, "signed"),
            Self::Enum(desc) => write!(f, "{} ({} variants)", desc.name, desc.variants),
        }
    }
}

/// A decoded field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Enum(u32),
}

impl Operand {
    /// Value widened to 64 bits; signed variants are sign-extended.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Bool(b) => b as i64,
            Self::U8(v) => v as i64,
            Self::U16(v) => v as i64,
            Self::U32(v) => v as i64,
            Self::U64(v) => v as i64,
            Self::I8(v) => v as i64,
            Self::I16(v) => v as i64,
            Self::I32(v) => v as i64,
            Self::I64(v) => v,
            Self::Enum(v) => v as i64,
        }
    }

    /// Bit pattern widened to 64 bits.
    #[inline]
    pub fn bits(self) -> u64 {
        self.as_i64() as u64
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::I8(_) | Self::I16(_) | Self::I32(_) | Self::I64(_) => {
                write!(f, "{}", self.as_i64())
            }
            _ => write!(f, "0x{:X}", self.bits()),
        }
    }
}

/// Conversion from an operand into a handler's parameter type.
pub trait FromOperand {
    fn from_operand(operand: Operand) -> Self;
}

impl FromOperand for bool {
    fn from_operand(operand: Operand) -> Self {
        operand.bits() != 0
    }
}

macro_rules! impl_from_operand {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromOperand for $ty {
                #[inline]
                fn from_operand(operand: Operand) -> Self {
                    operand.as_i64() as $ty
                }
            }
        )*
    };
}

impl_from_operand!(u8, u16, u32, u64, i8, i16, i32, i64);

/// Ordered argument list passed to a handler, one entry per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operands {
    values: SmallVec<[Operand; 8]>,
}

impl Operands {
    /// Field `index` converted to `T`. Panics if the index is out of range.
    #[inline]
    pub fn get<T: FromOperand>(&self, index: usize) -> T {
        T::from_operand(self.values[index])
    }

    /// Field `index` as an enumeration value.
    #[inline]
    pub fn get_enum<E: FieldEnum>(&self, index: usize) -> E {
        E::from_discriminant(self.values[index].bits() as u32)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operand> {
        self.values.iter()
    }
}

impl FromIterator<Operand> for Operands {
    fn from_iter<I: IntoIterator<Item = Operand>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Shift {
        Lsl,
        Lsr,
        Asr,
        Ror,
    }

    impl FieldEnum for Shift {
        const NAME: &'static str = "Shift";
        const VARIANTS: u32 = 4;

        fn from_discriminant(value: u32) -> Self {
            match value {
                0 => Self::Lsl,
                1 => Self::Lsr,
                2 => Self::Asr,
                _ => Self::Ror,
            }
        }
    }

    #[test]
    fn test_accepts_width() {
        assert!(FieldKind::U8.accepts_width(8));
        assert!(FieldKind::U8.accepts_width(9));
        assert!(FieldKind::I16.accepts_width(16));
        assert!(FieldKind::U32.accepts_width(33));
        assert!(FieldKind::Bool.accepts_width(12));
        assert!(FieldKind::Signed.accepts_width(26));
        assert!(FieldKind::enumeration::<Shift>().accepts_width(2));
        assert!(!FieldKind::enumeration::<Shift>().accepts_width(3));
    }

    #[test]
    fn test_coerce_unsigned() {
        assert_eq!(FieldKind::U8.coerce(0xAB, 8), Operand::U8(0xAB));
        assert_eq!(FieldKind::U32.coerce(0xFFF, 12), Operand::U32(0xFFF));
        assert_eq!(FieldKind::Bool.coerce(0, 1), Operand::Bool(false));
        assert_eq!(FieldKind::Bool.coerce(2, 2), Operand::Bool(true));
    }

    #[test]
    fn test_coerce_reinterpret() {
        // Full-width fields reinterpret the top bit, narrower ones stay positive.
        assert_eq!(FieldKind::I8.coerce(0xFF, 8), Operand::I8(-1));
        assert_eq!(FieldKind::I8.coerce(0x1F, 5), Operand::I8(31));
        assert_eq!(FieldKind::I16.coerce(0x8000, 16), Operand::I16(i16::MIN));
    }

    #[test]
    fn test_coerce_signed() {
        assert_eq!(FieldKind::Signed.coerce(0x1F, 5), Operand::I64(-1));
        assert_eq!(FieldKind::Signed.coerce(0x0F, 5), Operand::I64(15));
        assert_eq!(FieldKind::Signed.coerce(0x7FFFF, 19), Operand::I64(-1));
    }

    #[test]
    fn test_operands_get() {
        let ops: Operands = [
            Operand::Bool(true),
            Operand::U8(31),
            Operand::I64(-8),
            Operand::Enum(2),
        ]
        .into_iter()
        .collect();
        assert_eq!(ops.len(), 4);
        assert!(ops.get::<bool>(0));
        assert_eq!(ops.get::<u8>(1), 31);
        assert_eq!(ops.get::<u32>(1), 31);
        assert_eq!(ops.get::<i64>(2), -8);
        assert_eq!(ops.get_enum::<Shift>(3), Shift::Asr);
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldKind::U16.to_string(), "u16");
        assert_eq!(
            FieldKind::enumeration::<Shift>().to_string(),
            "Shift (4 variants)"
        );
        assert_eq!(Operand::U8(0x1F).to_string(), "0x1F");
        assert_eq!(Operand::I64(-4).to_string(), "-4");
        assert_eq!(Operand::Bool(true).to_string(), "true");
    }
}
