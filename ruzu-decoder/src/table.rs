// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Linear decode table: first matching encoding wins.

use std::fmt;

use log::debug;

use crate::binder::{Access, Mutable, ReadOnly};
use crate::matcher::Matcher;
use crate::opcode::Opcode;

pub struct DecodeTable<T: Opcode, V, R, C: Access> {
    entries: Vec<Matcher<T, V, R, C>>,
}

impl<T: Opcode, V, R, C: Access> fmt::Debug for DecodeTable<T, V, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeTable")
            .field("entries", &self.entries)
            .finish()
    }
}

impl<T: Opcode, V, R, C: Access> DecodeTable<T, V, R, C> {
    /// Keeps declaration order.
    pub fn new(entries: Vec<Matcher<T, V, R, C>>) -> Self {
        debug!("decode table: {} encodings", entries.len());
        Self { entries }
    }

    /// Sorts by specificity, most fixed bits first. Ties keep declaration
    /// order.
    pub fn by_specificity(mut entries: Vec<Matcher<T, V, R, C>>) -> Self {
        entries.sort_by(|a, b| b.specificity().cmp(&a.specificity()));
        Self::new(entries)
    }

    /// First encoding matching `word`.
    pub fn decode(&self, word: T) -> Option<&Matcher<T, V, R, C>> {
        self.entries.iter().find(|m| m.matches(word))
    }

    pub fn find(&self, name: &str) -> Option<&Matcher<T, V, R, C>> {
        self.entries.iter().find(|m| m.name() == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Matcher<T, V, R, C>> {
        self.entries.iter()
    }
}

impl<T: Opcode, V, R> DecodeTable<T, V, R, ReadOnly> {
    /// Decode `word` and invoke the matching handler, if any.
    pub fn dispatch(&self, word: T, visitor: &V) -> Option<R> {
        self.decode(word).map(|m| m.invoke(word, visitor))
    }
}

impl<T: Opcode, V, R> DecodeTable<T, V, R, Mutable> {
    /// Decode `word` and invoke the matching handler, if any.
    pub fn dispatch(&self, word: T, visitor: &mut V) -> Option<R> {
        self.decode(word).map(|m| m.invoke(word, visitor))
    }
}
