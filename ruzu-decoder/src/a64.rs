// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! ARM64 (A64) encodings declared through the pattern generator.
//!
//! Covers integer immediates, shifted-register add/sub, wide moves, branches
//! and a few system instructions. Field letters follow the ARM ARM: `z` is
//! `sf`, `d`/`n`/`m`/`t` are register numbers, `i` immediates, `h` shift
//! amounts, `c` condition codes.

use crate::binder::{Handler, ReadOnly};
use crate::error::DecoderError;
use crate::matcher::{make_matcher, Matcher};
use crate::operand::{FieldEnum, FieldKind, Operands};
use crate::table::DecodeTable;

use crate::operand::FieldKind::{Bool, Signed, U16, U32, U8};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Shift type used by data-processing (register) instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftType {
    LSL = 0,
    LSR = 1,
    ASR = 2,
    ROR = 3,
}

impl FieldEnum for ShiftType {
    const NAME: &'static str = "ShiftType";
    const VARIANTS: u32 = 4;

    fn from_discriminant(value: u32) -> Self {
        match value & 3 {
            0 => Self::LSL,
            1 => Self::LSR,
            2 => Self::ASR,
            _ => Self::ROR,
        }
    }
}

/// Condition code of B.cond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    EQ,
    NE,
    CS,
    CC,
    MI,
    PL,
    VS,
    VC,
    HI,
    LS,
    GE,
    LT,
    GT,
    LE,
    AL,
    NV,
}

impl FieldEnum for Condition {
    const NAME: &'static str = "Condition";
    const VARIANTS: u32 = 16;

    fn from_discriminant(value: u32) -> Self {
        const ALL: [Condition; 16] = [
            Condition::EQ,
            Condition::NE,
            Condition::CS,
            Condition::CC,
            Condition::MI,
            Condition::PL,
            Condition::VS,
            Condition::VC,
            Condition::HI,
            Condition::LS,
            Condition::GE,
            Condition::LT,
            Condition::GT,
            Condition::LE,
            Condition::AL,
            Condition::NV,
        ];
        ALL[(value & 0xF) as usize]
    }
}

/// Decoded A64 instruction. Branch targets are absolute addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    AddImm { sf: bool, rd: u8, rn: u8, imm: u64, set_flags: bool },
    SubImm { sf: bool, rd: u8, rn: u8, imm: u64, set_flags: bool },
    AddReg { sf: bool, rd: u8, rn: u8, rm: u8, shift: ShiftType, amount: u8, set_flags: bool },
    SubReg { sf: bool, rd: u8, rn: u8, rm: u8, shift: ShiftType, amount: u8, set_flags: bool },
    MovZ { sf: bool, rd: u8, imm16: u16, hw: u8 },
    MovN { sf: bool, rd: u8, imm16: u16, hw: u8 },
    MovK { sf: bool, rd: u8, imm16: u16, hw: u8 },
    B { target: u64 },
    Bl { target: u64 },
    BCond { cond: Condition, target: u64 },
    Cbz { sf: bool, rt: u8, target: u64 },
    Cbnz { sf: bool, rt: u8, target: u64 },
    Br { rn: u8 },
    Blr { rn: u8 },
    Ret { rn: u8 },
    Nop,
    Svc { imm: u16 },
    Brk { imm: u16 },
    Unknown { raw: u32 },
}

/// Read-only decode context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct A64Context {
    /// Address of the instruction being decoded.
    pub pc: u64,
    /// The instruction word itself, for handlers that reject unallocated
    /// encodings.
    pub raw: u32,
}

impl A64Context {
    /// `offset` is in instruction words.
    fn branch_target(&self, offset: i64) -> u64 {
        self.pc.wrapping_add((offset << 2) as u64)
    }
}

// ---------------------------------------------------------------------------
// Handler functions
// ---------------------------------------------------------------------------

type A64Matcher = Matcher<u32, A64Context, Instruction, ReadOnly>;

// sf, sh, imm12, Rn, Rd
fn imm12(ops: &Operands) -> (bool, u8, u8, u64) {
    let imm = ops.get::<u64>(2);
    let imm = if ops.get::<bool>(1) { imm << 12 } else { imm };
    (ops.get(0), ops.get(4), ops.get(3), imm)
}

fn h_add_imm(_: &A64Context, ops: &Operands) -> Instruction {
    let (sf, rd, rn, imm) = imm12(ops);
    Instruction::AddImm { sf, rd, rn, imm, set_flags: false }
}

fn h_adds_imm(_: &A64Context, ops: &Operands) -> Instruction {
    let (sf, rd, rn, imm) = imm12(ops);
    Instruction::AddImm { sf, rd, rn, imm, set_flags: true }
}

fn h_sub_imm(_: &A64Context, ops: &Operands) -> Instruction {
    let (sf, rd, rn, imm) = imm12(ops);
    Instruction::SubImm { sf, rd, rn, imm, set_flags: false }
}

fn h_subs_imm(_: &A64Context, ops: &Operands) -> Instruction {
    let (sf, rd, rn, imm) = imm12(ops);
    Instruction::SubImm { sf, rd, rn, imm, set_flags: true }
}

// sf, shift, Rm, imm6, Rn, Rd
fn shifted_reg(ctx: &A64Context, ops: &Operands, subtract: bool) -> Instruction {
    let sf: bool = ops.get(0);
    let shift: ShiftType = ops.get_enum(1);
    let amount: u8 = ops.get(3);
    // ROR, and 32-bit shifts by 32 or more, are unallocated.
    if shift == ShiftType::ROR || (!sf && amount >= 32) {
        return Instruction::Unknown { raw: ctx.raw };
    }
    let (rm, rn, rd) = (ops.get(2), ops.get(4), ops.get(5));
    if subtract {
        Instruction::SubReg { sf, rd, rn, rm, shift, amount, set_flags: false }
    } else {
        Instruction::AddReg { sf, rd, rn, rm, shift, amount, set_flags: false }
    }
}

fn h_add_reg(ctx: &A64Context, ops: &Operands) -> Instruction {
    shifted_reg(ctx, ops, false)
}

fn h_sub_reg(ctx: &A64Context, ops: &Operands) -> Instruction {
    shifted_reg(ctx, ops, true)
}

// sf, hw, imm16, Rd
fn h_movz(_: &A64Context, ops: &Operands) -> Instruction {
    Instruction::MovZ { sf: ops.get(0), hw: ops.get(1), imm16: ops.get(2), rd: ops.get(3) }
}

fn h_movn(_: &A64Context, ops: &Operands) -> Instruction {
    Instruction::MovN { sf: ops.get(0), hw: ops.get(1), imm16: ops.get(2), rd: ops.get(3) }
}

fn h_movk(_: &A64Context, ops: &Operands) -> Instruction {
    Instruction::MovK { sf: ops.get(0), hw: ops.get(1), imm16: ops.get(2), rd: ops.get(3) }
}

fn h_b(ctx: &A64Context, ops: &Operands) -> Instruction {
    Instruction::B { target: ctx.branch_target(ops.get(0)) }
}

fn h_bl(ctx: &A64Context, ops: &Operands) -> Instruction {
    Instruction::Bl { target: ctx.branch_target(ops.get(0)) }
}

fn h_bcond(ctx: &A64Context, ops: &Operands) -> Instruction {
    Instruction::BCond { target: ctx.branch_target(ops.get(0)), cond: ops.get_enum(1) }
}

fn h_cbz(ctx: &A64Context, ops: &Operands) -> Instruction {
    Instruction::Cbz { sf: ops.get(0), target: ctx.branch_target(ops.get(1)), rt: ops.get(2) }
}

fn h_cbnz(ctx: &A64Context, ops: &Operands) -> Instruction {
    Instruction::Cbnz { sf: ops.get(0), target: ctx.branch_target(ops.get(1)), rt: ops.get(2) }
}

fn h_br(_: &A64Context, ops: &Operands) -> Instruction {
    Instruction::Br { rn: ops.get(0) }
}

fn h_blr(_: &A64Context, ops: &Operands) -> Instruction {
    Instruction::Blr { rn: ops.get(0) }
}

fn h_ret(_: &A64Context, ops: &Operands) -> Instruction {
    Instruction::Ret { rn: ops.get(0) }
}

fn h_nop(_: &A64Context, _: &Operands) -> Instruction {
    Instruction::Nop
}

fn h_svc(_: &A64Context, ops: &Operands) -> Instruction {
    Instruction::Svc { imm: ops.get(0) }
}

fn h_brk(_: &A64Context, ops: &Operands) -> Instruction {
    Instruction::Brk { imm: ops.get(0) }
}

// ---------------------------------------------------------------------------
// Decode table
// ---------------------------------------------------------------------------

fn inst(
    name: &'static str,
    pattern: &str,
    kinds: &[FieldKind],
    handler: fn(&A64Context, &Operands) -> Instruction,
) -> Result<A64Matcher, DecoderError> {
    make_matcher(name, pattern, kinds, Handler::ReadOnly(handler))
}

fn make_decode_table() -> Result<Vec<A64Matcher>, DecoderError> {
    let shift = FieldKind::enumeration::<ShiftType>();
    let cond = FieldKind::enumeration::<Condition>();
    let add_sub_imm = [Bool, Bool, U32, U8, U8];
    let shifted = [Bool, shift, U8, U8, U8, U8];
    let wide = [Bool, U8, U16, U8];

    Ok(vec![
        // == Data processing (immediate) ==
        inst("ADD_imm", "z00100010hiiiiiiiiiiiinnnnnddddd", &add_sub_imm, h_add_imm)?,
        inst("ADDS_imm", "z01100010hiiiiiiiiiiiinnnnnddddd", &add_sub_imm, h_adds_imm)?,
        inst("SUB_imm", "z10100010hiiiiiiiiiiiinnnnnddddd", &add_sub_imm, h_sub_imm)?,
        inst("SUBS_imm", "z11100010hiiiiiiiiiiiinnnnnddddd", &add_sub_imm, h_subs_imm)?,
        inst("MOVN", "z00100101hhiiiiiiiiiiiiiiiiddddd", &wide, h_movn)?,
        inst("MOVZ", "z10100101hhiiiiiiiiiiiiiiiiddddd", &wide, h_movz)?,
        inst("MOVK", "z11100101hhiiiiiiiiiiiiiiiiddddd", &wide, h_movk)?,
        // == Data processing (register) ==
        inst("ADD_shift", "z0001011ss0mmmmmiiiiiinnnnnddddd", &shifted, h_add_reg)?,
        inst("SUB_shift", "z1001011ss0mmmmmiiiiiinnnnnddddd", &shifted, h_sub_reg)?,
        // == Branches ==
        inst("B", "000101iiiiiiiiiiiiiiiiiiiiiiiiii", &[Signed], h_b)?,
        inst("BL", "100101iiiiiiiiiiiiiiiiiiiiiiiiii", &[Signed], h_bl)?,
        inst("B_cond", "01010100iiiiiiiiiiiiiiiiiii0cccc", &[Signed, cond], h_bcond)?,
        inst("CBZ", "z0110100iiiiiiiiiiiiiiiiiiittttt", &[Bool, Signed, U8], h_cbz)?,
        inst("CBNZ", "z0110101iiiiiiiiiiiiiiiiiiittttt", &[Bool, Signed, U8], h_cbnz)?,
        inst("BR", "1101011000011111000000nnnnn00000", &[U8], h_br)?,
        inst("BLR", "1101011000111111000000nnnnn00000", &[U8], h_blr)?,
        inst("RET", "1101011001011111000000nnnnn00000", &[U8], h_ret)?,
        // == System ==
        inst("NOP", "11010101000000110010000000011111", &[], h_nop)?,
        inst("SVC", "11010100000iiiiiiiiiiiiiiii00001", &[U16], h_svc)?,
        inst("BRK", "11010100001iiiiiiiiiiiiiiii00000", &[U16], h_brk)?,
    ])
}

/// A64 decoder over a specificity-ordered table.
pub struct A64Decoder {
    table: DecodeTable<u32, A64Context, Instruction, ReadOnly>,
}

impl A64Decoder {
    pub fn new() -> Result<Self, DecoderError> {
        Ok(Self {
            table: DecodeTable::by_specificity(make_decode_table()?),
        })
    }

    /// Decode the instruction word at `pc`.
    pub fn decode(&self, pc: u64, raw: u32) -> Instruction {
        self.table
            .dispatch(raw, &A64Context { pc, raw })
            .unwrap_or(Instruction::Unknown { raw })
    }

    /// Name of the encoding `raw` matches, if any.
    pub fn encoding_name(&self, raw: u32) -> Option<&str> {
        self.table.decode(raw).map(|m| m.name())
    }

    pub fn table(&self) -> &DecodeTable<u32, A64Context, Instruction, ReadOnly> {
        &self.table
    }
}
