// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::borrow::Cow;

use thiserror::Error;

use crate::binder::Capability;
use crate::operand::FieldKind;

/// Construction-time failure for a single pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern has {found} symbols, opcode is {expected} bits wide")]
    Length { expected: u32, found: usize },

    #[error("field bit at position {position} exceeds the {declared} declared field(s)")]
    FieldOverflow { position: u32, declared: usize },

    #[error("field {index} is declared but absent ({declared} declared, {found} in pattern)")]
    MissingField {
        index: usize,
        declared: usize,
        found: usize,
    },

    #[error("field {index} is {width} bits wide and does not fit {kind}")]
    FieldTooWide {
        index: usize,
        width: u32,
        kind: FieldKind,
    },

    #[error("handler needs a {handler} receiver, matcher is bound to {required}")]
    CapabilityMismatch {
        required: Capability,
        handler: Capability,
    },
}

/// Error surfaced to whoever builds a decode table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoderError {
    #[error("invalid encoding `{name}`: {source}")]
    InvalidEncoding {
        name: Cow<'static, str>,
        #[source]
        source: PatternError,
    },
}

impl DecoderError {
    /// Name of the encoding that failed to build.
    pub fn name(&self) -> &str {
        match self {
            Self::InvalidEncoding { name, .. } => name,
        }
    }

    /// The underlying pattern failure.
    pub fn pattern_error(&self) -> &PatternError {
        match self {
            Self::InvalidEncoding { source, .. } => source,
        }
    }
}
