// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bit-pattern instruction decoder generator.
//!
//! Each encoding is declared once as a pattern string plus a handler; the
//! result is a [`Matcher`] that tests words in constant time and extracts
//! operand fields for the handler.

pub mod a64;
pub mod binder;
pub mod error;
pub mod fields;
pub mod matcher;
pub mod opcode;
pub mod operand;
pub mod pattern;
pub mod table;

pub use binder::{Access, Capability, Handler, Mutable, ReadOnly};
pub use error::{DecoderError, PatternError};
pub use fields::{compile_fields, count_field_runs, FieldInfo};
pub use matcher::{make_matcher, Matcher};
pub use opcode::Opcode;
pub use operand::{EnumSpec, FieldEnum, FieldKind, FromOperand, Operand, Operands};
pub use pattern::{compile_match, MaskAndExpect, Pattern};
pub use table::DecodeTable;
