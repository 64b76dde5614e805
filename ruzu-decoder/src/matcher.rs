// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use log::debug;

use crate::binder::{bind, Access, Binding, Capability, Handler, Mutable, ReadOnly};
use crate::error::{DecoderError, PatternError};
use crate::fields::{compile_fields, FieldInfo};
use crate::opcode::Opcode;
use crate::operand::{FieldKind, Operands};
use crate::pattern::{compile_match, MaskAndExpect, Pattern};

/// A compiled encoding: match predicate plus bound field dispatch.
///
/// `T` is the opcode type, `V` the receiver, `R` the handler result and `C`
/// the receiver access ([`ReadOnly`] or [`Mutable`]).
pub struct Matcher<T: Opcode, V, R, C: Access> {
    name: Cow<'static, str>,
    mask: T,
    expect: T,
    binding: Binding<T>,
    handler: C::Fn<V, R>,
    _access: PhantomData<C>,
}

/// Compiles `pattern` and binds `handler` with one parameter per entry of
/// `kinds`, in field order.
pub fn make_matcher<T: Opcode, V, R, C: Access>(
    name: impl Into<Cow<'static, str>>,
    pattern: &str,
    kinds: &[FieldKind],
    handler: Handler<V, R>,
) -> Result<Matcher<T, V, R, C>, DecoderError> {
    let name = name.into();
    let (me, f, binding) = match build::<T, V, R, C>(pattern, kinds, handler) {
        Ok(built) => built,
        Err(source) => return Err(DecoderError::InvalidEncoding { name, source }),
    };
    debug!(
        "matcher {}: mask={:#x} expect={:#x} fields={}",
        name,
        me.mask,
        me.expect,
        binding.fields().len()
    );
    Ok(Matcher {
        name,
        mask: me.mask,
        expect: me.expect,
        binding,
        handler: f,
        _access: PhantomData,
    })
}

#[allow(clippy::type_complexity)]
fn build<T: Opcode, V, R, C: Access>(
    pattern: &str,
    kinds: &[FieldKind],
    handler: Handler<V, R>,
) -> Result<(MaskAndExpect<T>, C::Fn<V, R>, Binding<T>), PatternError> {
    let pattern = Pattern::<T>::new(pattern)?;
    let me = compile_match(&pattern);
    let fields = compile_fields(&pattern, kinds.len())?;
    let (f, binding) = bind::<T, V, R, C>(handler, &fields, kinds)?;
    Ok((me, f, binding))
}

impl<T: Opcode, V, R, C: Access> Matcher<T, V, R, C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mask(&self) -> T {
        self.mask
    }

    pub fn expect(&self) -> T {
        self.expect
    }

    pub fn capability(&self) -> Capability {
        C::CAPABILITY
    }

    /// Number of fixed bits; more fixed bits means a more specific encoding.
    pub fn specificity(&self) -> u32 {
        self.mask.count_ones()
    }

    pub fn fields(&self) -> impl ExactSizeIterator<Item = &FieldInfo<T>> {
        self.binding.fields().iter().map(|f| &f.info)
    }

    #[inline]
    pub fn matches(&self, word: T) -> bool {
        (word & self.mask) == self.expect
    }

    /// Operands of `word` without calling the handler.
    #[inline]
    pub fn extract(&self, word: T) -> Operands {
        self.binding.extract(word)
    }
}

impl<T: Opcode, V, R> Matcher<T, V, R, ReadOnly> {
    /// Decode `word` and call the handler. Only meaningful when
    /// [`matches`](Self::matches) holds for `word`.
    #[inline]
    pub fn invoke(&self, word: T, visitor: &V) -> R {
        let operands = self.binding.extract(word);
        (self.handler)(visitor, &operands)
    }
}

impl<T: Opcode, V, R> Matcher<T, V, R, Mutable> {
    /// Decode `word` and call the handler. Only meaningful when
    /// [`matches`](Self::matches) holds for `word`.
    #[inline]
    pub fn invoke(&self, word: T, visitor: &mut V) -> R {
        let operands = self.binding.extract(word);
        (self.handler)(visitor, &operands)
    }
}

impl<T: Opcode, V, R, C: Access> Clone for Matcher<T, V, R, C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            mask: self.mask,
            expect: self.expect,
            binding: self.binding.clone(),
            handler: self.handler,
            _access: PhantomData,
        }
    }
}

impl<T: Opcode, V, R, C: Access> fmt::Debug for Matcher<T, V, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("name", &self.name)
            .field("mask", &format_args!("{:#x}", self.mask))
            .field("expect", &format_args!("{:#x}", self.expect))
            .field("capability", &C::CAPABILITY)
            .field("fields", &self.binding.fields())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Arc;

    fn field_a(_: &(), ops: &Operands) -> u8 {
        ops.get(0)
    }

    fn pair(_: &(), ops: &Operands) -> (u8, u8) {
        (ops.get(0), ops.get(1))
    }

    fn all(_: &(), ops: &Operands) -> Vec<u64> {
        ops.iter().map(|op| op.bits()).collect()
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(u16, u16, u16)>,
    }

    fn record(r: &mut Recorder, ops: &Operands) -> usize {
        r.calls.push((ops.get(0), ops.get(1), ops.get(2)));
        r.calls.len()
    }

    struct Counting {
        calls: Cell<u32>,
    }

    fn count(c: &Counting, ops: &Operands) -> i64 {
        c.calls.set(c.calls.get() + 1);
        ops.get::<i64>(0) * 10
    }

    #[test]
    fn test_single_field_scenario() {
        let m = make_matcher::<u8, (), u8, ReadOnly>(
            "LD",
            "0011aaaa",
            &[FieldKind::U8],
            Handler::ReadOnly(field_a),
        )
        .unwrap();
        assert_eq!(m.mask(), 0xF0);
        assert_eq!(m.expect(), 0x30);
        assert_eq!(m.specificity(), 4);
        let fields: Vec<_> = m.fields().copied().collect();
        assert_eq!((fields[0].mask, fields[0].shift), (0x0F, 0));

        assert!(m.matches(0x35));
        assert_eq!(m.invoke(0x35, &()), 0x05);
        assert!(!m.matches(0x25));
    }

    #[test]
    fn test_two_field_scenario() {
        let m = make_matcher::<u8, (), (u8, u8), ReadOnly>(
            "ST",
            "1-aabb01",
            &[FieldKind::U8, FieldKind::U8],
            Handler::ReadOnly(pair),
        )
        .unwrap();
        assert_eq!(m.mask(), 0x83);
        assert_eq!(m.expect(), 0x81);
        let fields: Vec<_> = m.fields().copied().collect();
        assert_eq!((fields[0].mask, fields[0].shift), (0x30, 4));
        assert_eq!((fields[1].mask, fields[1].shift), (0x0C, 2));

        // Don't-care bit 6 set, a=0b01, b=0b10.
        let word = 0b1_1_01_10_01;
        assert!(m.matches(word));
        assert_eq!(m.invoke(word, &()), (0b01, 0b10));
    }

    #[test]
    fn test_wide_field_narrows_to_u8() {
        let m = make_matcher::<u16, (), u8, ReadOnly>(
            "N",
            "aaaaaaaaa-------",
            &[FieldKind::U8],
            Handler::ReadOnly(field_a),
        )
        .unwrap();
        assert_eq!(m.fields().next().map(|f| f.width()), Some(9));
        // Field value 0x1A5 keeps its low byte.
        assert_eq!(m.invoke(0x1A5 << 7, &()), 0xA5);
    }

    #[test]
    fn test_fields_are_independent() {
        let m = make_matcher::<u8, (), (u8, u8), ReadOnly>(
            "ST",
            "1-aabb01",
            &[FieldKind::U8, FieldKind::U8],
            Handler::ReadOnly(pair),
        )
        .unwrap();
        for a in 0..4u8 {
            for b in 0..4u8 {
                let word = 0x81 | (a << 4) | (b << 2);
                assert_eq!(m.invoke(word, &()), (a, b));
            }
        }
    }

    #[test]
    fn test_mutable_receiver_order() {
        let m = make_matcher::<u16, Recorder, usize, Mutable>(
            "OP3",
            "0001xxxxyyyyzzzz",
            &[FieldKind::U16, FieldKind::U16, FieldKind::U16],
            Handler::Mutable(record),
        )
        .unwrap();
        assert_eq!(m.capability(), Capability::Mutable);

        let mut rec = Recorder::default();
        assert!(m.matches(0x1ABC));
        assert_eq!(m.invoke(0x1ABC, &mut rec), 1);
        assert_eq!(m.invoke(0x1123, &mut rec), 2);
        assert_eq!(rec.calls, vec![(0xA, 0xB, 0xC), (0x1, 0x2, 0x3)]);
    }

    #[test]
    fn test_handler_called_once() {
        let m = make_matcher::<u32, Counting, i64, ReadOnly>(
            "IMM",
            "11110000000000000000000000ssssss",
            &[FieldKind::Signed],
            Handler::ReadOnly(count),
        )
        .unwrap();
        let c = Counting { calls: Cell::new(0) };
        assert_eq!(m.invoke(0xF000_0021, &c), -310);
        assert_eq!(c.calls.get(), 1);
        assert_eq!(m.invoke(0xF000_0005, &c), 50);
        assert_eq!(c.calls.get(), 2);
    }

    #[test]
    fn test_invoke_on_non_matching_word() {
        let m = make_matcher::<u8, (), u8, ReadOnly>(
            "LD",
            "0011aaaa",
            &[FieldKind::U8],
            Handler::ReadOnly(field_a),
        )
        .unwrap();
        assert!(!m.matches(0xF7));
        assert_eq!(m.invoke(0xF7, &()), 0x07);
    }

    #[test]
    fn test_errors_carry_name() {
        let err = make_matcher::<u8, (), u8, ReadOnly>(
            "SHORT",
            "0011aaa",
            &[FieldKind::U8],
            Handler::ReadOnly(field_a),
        )
        .unwrap_err();
        assert_eq!(err.name(), "SHORT");
        assert_eq!(err.pattern_error(), &PatternError::Length { expected: 8, found: 7 });

        let err = make_matcher::<u8, (), (u8, u8), ReadOnly>(
            "UNDER",
            "1-aabb01",
            &[FieldKind::U8],
            Handler::ReadOnly(pair),
        )
        .unwrap_err();
        assert!(matches!(err.pattern_error(), PatternError::FieldOverflow { .. }));

        let err = make_matcher::<u8, (), (u8, u8), ReadOnly>(
            "OVER",
            "0011aaaa",
            &[FieldKind::U8, FieldKind::U8],
            Handler::ReadOnly(pair),
        )
        .unwrap_err();
        assert!(matches!(err.pattern_error(), PatternError::MissingField { index: 1, .. }));

        let err = make_matcher::<u8, Recorder, usize, ReadOnly>(
            "CAP",
            "0001xxxx",
            &[FieldKind::U16],
            Handler::Mutable(record),
        )
        .unwrap_err();
        assert!(matches!(err.pattern_error(), PatternError::CapabilityMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "invalid encoding `CAP`: handler needs a mutable receiver, matcher is bound to read-only"
        );
    }

    #[test]
    fn test_match_sweep() {
        let pattern = "0-1aa-bb10cccc-1";
        let m = make_matcher::<u16, (), Vec<u64>, ReadOnly>(
            "SWEEP",
            pattern,
            &[FieldKind::U8, FieldKind::U8, FieldKind::U8],
            Handler::ReadOnly(all),
        )
        .unwrap();

        let mut rng_state: u64 = 0xDEAD_BEEF_CAFE_BABE;
        for _ in 0..10_000 {
            rng_state ^= rng_state << 13;
            rng_state ^= rng_state >> 7;
            rng_state ^= rng_state << 17;
            let word = rng_state as u16;

            let expected = pattern.chars().enumerate().all(|(i, ch)| {
                let bit = (word >> (15 - i)) & 1;
                match ch {
                    '0' => bit == 0,
                    '1' => bit == 1,
                    _ => true,
                }
            });
            assert_eq!(m.matches(word), expected, "word 0x{word:04X}");

            let ops = m.invoke(word, &());
            assert_eq!(ops[0], ((word >> 11) & 0x3) as u64);
            assert_eq!(ops[1], ((word >> 8) & 0x3) as u64);
            assert_eq!(ops[2], ((word >> 2) & 0xF) as u64);
        }
    }

    #[test]
    fn test_shared_across_threads() {
        let m = Arc::new(
            make_matcher::<u32, (), (u8, u8), ReadOnly>(
                "PAIR",
                "1010----------------aaaa----bbbb",
                &[FieldKind::U8, FieldKind::U8],
                Handler::ReadOnly(pair),
            )
            .unwrap(),
        );

        std::thread::scope(|s| {
            for t in 0..4u32 {
                let m = Arc::clone(&m);
                s.spawn(move || {
                    for i in 0..1000u32 {
                        let a = (i + t) & 0xF;
                        let b = (i * 3 + t) & 0xF;
                        let word = 0xA000_0000 | (a << 8) | b;
                        assert!(m.matches(word));
                        assert_eq!(m.invoke(word, &()), (a as u8, b as u8));
                    }
                });
            }
        });
    }
}
