// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::types::OpcodeWidth;

/// One declared encoding: diagnostic name and its bit pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    pub name: String,
    pub pattern: String,
}

/// Decoder tool settings, populated from config INI and the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    // Decoder
    pub opcode_width: OpcodeWidth,
    pub sort_by_specificity: bool,

    // Patterns, in declaration order
    pub patterns: Vec<PatternEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            opcode_width: OpcodeWidth::W32,
            sort_by_specificity: false,
            patterns: Vec::new(),
        }
    }
}

impl Settings {
    /// Add or replace the pattern called `name`.
    pub fn set_pattern(&mut self, name: &str, pattern: &str) {
        match self.patterns.iter_mut().find(|p| p.name == name) {
            Some(entry) => entry.pattern = pattern.to_string(),
            None => self.patterns.push(PatternEntry {
                name: name.to_string(),
                pattern: pattern.to_string(),
            }),
        }
    }
}

/// Parse a boolean config value.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.opcode_width, OpcodeWidth::W32);
        assert!(!s.sort_by_specificity);
        assert!(s.patterns.is_empty());
    }

    #[test]
    fn test_set_pattern_replaces() {
        let mut s = Settings::default();
        s.set_pattern("A", "0000aaaa");
        s.set_pattern("B", "1111bbbb");
        s.set_pattern("A", "0001aaaa");
        assert_eq!(s.patterns.len(), 2);
        assert_eq!(s.patterns[0].name, "A");
        assert_eq!(s.patterns[0].pattern, "0001aaaa");
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool(" True "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
