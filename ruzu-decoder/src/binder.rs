// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Binds field layouts and typed parameters to a handler.
//!
//! Planning (enum variant checks and receiver capability) happens once in
//! [`bind`]; per-word work is only masking, shifting and coercion.

use std::fmt;

use crate::error::PatternError;
use crate::fields::FieldInfo;
use crate::opcode::Opcode;
use crate::operand::{FieldKind, Operands};

/// Receiver access a handler requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ReadOnly,
    Mutable,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "read-only"),
            Self::Mutable => write!(f, "mutable"),
        }
    }
}

/// Handler for one encoding, taking the receiver and the decoded operands.
pub enum Handler<V, R> {
    ReadOnly(fn(&V, &Operands) -> R),
    Mutable(fn(&mut V, &Operands) -> R),
}

impl<V, R> Handler<V, R> {
    pub fn capability(&self) -> Capability {
        match self {
            Self::ReadOnly(_) => Capability::ReadOnly,
            Self::Mutable(_) => Capability::Mutable,
        }
    }
}

impl<V, R> Clone for Handler<V, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, R> Copy for Handler<V, R> {}

impl<V, R> fmt::Debug for Handler<V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({})", self.capability())
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::ReadOnly {}
    impl Sealed for super::Mutable {}
}

/// Receiver access a matcher is declared with.
///
/// Implemented by [`ReadOnly`] and [`Mutable`]; a matcher's `invoke` takes
/// `&V` or `&mut V` accordingly.
pub trait Access: sealed::Sealed + Send + Sync + 'static {
    const CAPABILITY: Capability;

    /// Handler function pointer type for this access.
    type Fn<V, R>: Copy + Send + Sync;

    /// Returns the function pointer if the handler has this capability.
    fn select<V, R>(handler: Handler<V, R>) -> Option<Self::Fn<V, R>>;
}

/// Handlers receive `&V`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOnly;

/// Handlers receive `&mut V`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutable;

impl Access for ReadOnly {
    const CAPABILITY: Capability = Capability::ReadOnly;
    type Fn<V, R> = fn(&V, &Operands) -> R;

    fn select<V, R>(handler: Handler<V, R>) -> Option<Self::Fn<V, R>> {
        match handler {
            Handler::ReadOnly(f) => Some(f),
            Handler::Mutable(_) => None,
        }
    }
}

impl Access for Mutable {
    const CAPABILITY: Capability = Capability::Mutable;
    type Fn<V, R> = fn(&mut V, &Operands) -> R;

    fn select<V, R>(handler: Handler<V, R>) -> Option<Self::Fn<V, R>> {
        match handler {
            Handler::Mutable(f) => Some(f),
            Handler::ReadOnly(_) => None,
        }
    }
}

/// One field with its planned coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundField<T> {
    pub info: FieldInfo<T>,
    pub width: u32,
    pub kind: FieldKind,
}

/// Coercion plan for every field of an encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding<T> {
    fields: Vec<BoundField<T>>,
}

impl<T: Opcode> Binding<T> {
    /// Pairs each field with its declared kind. `fields` and `kinds` must
    /// have the same length (the field compiler guarantees this).
    pub fn new(fields: &[FieldInfo<T>], kinds: &[FieldKind]) -> Result<Self, PatternError> {
        let fields = fields
            .iter()
            .zip(kinds)
            .enumerate()
            .map(|(index, (info, kind))| {
                let width = info.width();
                if !kind.accepts_width(width) {
                    return Err(PatternError::FieldTooWide {
                        index,
                        width,
                        kind: *kind,
                    });
                }
                Ok(BoundField {
                    info: *info,
                    width,
                    kind: *kind,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[BoundField<T>] {
        &self.fields
    }

    /// Extract and coerce all fields of `word`, in field order.
    #[inline]
    pub fn extract(&self, word: T) -> Operands {
        self.fields
            .iter()
            .map(|f| f.kind.coerce(f.info.extract(word), f.width))
            .collect()
    }
}

/// Builds the binding and checks the handler against access `C`.
pub fn bind<T: Opcode, V, R, C: Access>(
    handler: Handler<V, R>,
    fields: &[FieldInfo<T>],
    kinds: &[FieldKind],
) -> Result<(C::Fn<V, R>, Binding<T>), PatternError> {
    let f = C::select(handler).ok_or(PatternError::CapabilityMismatch {
        required: C::CAPABILITY,
        handler: handler.capability(),
    })?;
    let binding = Binding::new(fields, kinds)?;
    Ok((f, binding))
}
