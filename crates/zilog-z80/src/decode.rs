//! Instruction decoding.
//!
//! [`decode`] classifies the instruction at an address without executing it
//! or touching machine state: it reads through [`Bus::peek`] only. The
//! result carries everything the engine needs besides the semantics
//! themselves: encoded length, T-states and the MEMPTR rule.

#![allow(clippy::cast_possible_truncation)]

use emu_core::Bus;

use crate::memptr::{ED_RULES, MemptrRule, UNPREFIXED_RULES};

/// Prefix chain in front of the final opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    None,
    Cb,
    Ed,
    Dd,
    Fd,
    DdCb,
    FdCb,
}

/// Index register selected by a DD or FD prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexRegister {
    Ix,
    Iy,
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub prefix: Prefix,
    pub opcode: u8,
    /// `d` in `(IX+d)`; zero when there is none.
    pub displacement: i8,
    /// Immediate byte or word; zero when there is none.
    pub operand: u16,
    /// Encoded length in bytes.
    pub length: u8,
    /// T-states when no branch is taken and no block op repeats.
    pub cycles: u32,
    /// T-states added when a branch is taken or a block op repeats.
    pub extra_cycles: u32,
    pub memptr: MemptrRule,
}

impl Instruction {
    /// Index register the prefix selects, if any.
    #[must_use]
    pub fn index(&self) -> Option<IndexRegister> {
        match self.prefix {
            Prefix::Dd | Prefix::DdCb => Some(IndexRegister::Ix),
            Prefix::Fd | Prefix::FdCb => Some(IndexRegister::Iy),
            Prefix::None | Prefix::Cb | Prefix::Ed => None,
        }
    }

    /// Opcode fetch (M1) cycles, each of which advances R.
    #[must_use]
    pub fn m1_fetches(&self) -> u8 {
        match self.prefix {
            Prefix::None => 1,
            _ => 2,
        }
    }

    /// True for `(IX+d)` / `(IY+d)` forms, including DD CB / FD CB.
    #[must_use]
    pub fn is_indexed_memory(&self) -> bool {
        match self.prefix {
            Prefix::DdCb | Prefix::FdCb => true,
            Prefix::Dd | Prefix::Fd => uses_hl_memory(self.opcode),
            _ => false,
        }
    }

    #[must_use]
    pub fn imm8(&self) -> u8 {
        self.operand as u8
    }

    #[must_use]
    pub fn imm16(&self) -> u16 {
        self.operand
    }
}

/// Unprefixed opcodes whose operand is `(HL)`; under DD/FD these become
/// `(IX+d)` / `(IY+d)` and take a displacement byte.
#[must_use]
pub const fn uses_hl_memory(op: u8) -> bool {
    match op {
        0x34..=0x36 => true,
        0x76 => false,
        0x40..=0x7F => op & 0x07 == 6 || op & 0x38 == 0x30,
        0x80..=0xBF => op & 0x07 == 6,
        _ => false,
    }
}

/// Bytes of immediate data following an unprefixed opcode.
const fn immediate_size(op: u8) -> u8 {
    match op {
        0x01 | 0x11 | 0x21 | 0x31 | 0x22 | 0x2A | 0x32 | 0x3A | 0xC3 | 0xCD => 2,
        // JP cc, CALL cc
        op if op & 0xC7 == 0xC2 || op & 0xC7 == 0xC4 => 2,
        // LD r,n and ALU A,n
        op if op & 0xC7 == 0x06 || op & 0xC7 == 0xC6 => 1,
        0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 | 0xD3 | 0xDB => 1,
        _ => 0,
    }
}

#[rustfmt::skip]
const UNPREFIXED_CYCLES: [u8; 256] = [
//  0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    4, 10,  7,  6,  4,  4,  7,  4,  4, 11,  7,  6,  4,  4,  7,  4, // 0x00
    8, 10,  7,  6,  4,  4,  7,  4, 12, 11,  7,  6,  4,  4,  7,  4, // 0x10
    7, 10, 16,  6,  4,  4,  7,  4,  7, 11, 16,  6,  4,  4,  7,  4, // 0x20
    7, 10, 13,  6, 11, 11, 10,  4,  7, 11, 13,  6,  4,  4,  7,  4, // 0x30
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 0x40
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 0x50
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 0x60
    7,  7,  7,  7,  7,  7,  4,  7,  4,  4,  4,  4,  4,  4,  7,  4, // 0x70
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 0x80
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 0x90
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 0xA0
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 0xB0
    5, 10, 10, 10, 10, 11,  7, 11,  5, 10, 10,  0, 10, 17,  7, 11, // 0xC0
    5, 10, 10, 11, 10, 11,  7, 11,  5,  4, 10, 11, 10,  0,  7, 11, // 0xD0
    5, 10, 10, 19, 10, 11,  7, 11,  5,  4, 10,  4, 10,  0,  7, 11, // 0xE0
    5, 10, 10,  4, 10, 11,  7, 11,  5,  6, 10,  4, 10,  0,  7, 11, // 0xF0
];

/// Extra T-states for taken branches.
const fn unprefixed_extra(op: u8) -> u32 {
    match op {
        0x10 | 0x20 | 0x28 | 0x30 | 0x38 => 5,
        op if op & 0xC7 == 0xC0 => 6,
        op if op & 0xC7 == 0xC4 => 7,
        _ => 0,
    }
}

const fn ed_cycles(op: u8) -> u32 {
    match op {
        0x40..=0x7F => match op & 7 {
            0 | 1 => 12,
            2 => 15,
            3 => 20,
            4 | 6 => 8,
            5 => 14,
            _ => match (op >> 3) & 7 {
                0..=3 => 9,
                4 | 5 => 18,
                _ => 8,
            },
        },
        0xA0..=0xA3 | 0xA8..=0xAB | 0xB0..=0xB3 | 0xB8..=0xBB => 16,
        _ => 8,
    }
}

/// True for ED opcodes that have a defined effect.
#[must_use]
pub const fn is_defined_ed(op: u8) -> bool {
    match op {
        0x77 | 0x7F => false,
        0x40..=0x7F => true,
        0xA0..=0xA3 | 0xA8..=0xAB | 0xB0..=0xB3 | 0xB8..=0xBB => true,
        _ => false,
    }
}

fn peek_word<B: Bus>(bus: &B, address: u16) -> u16 {
    u16::from_le_bytes([bus.peek(address), bus.peek(address.wrapping_add(1))])
}

/// Decode the instruction starting at `pc`.
pub fn decode<B: Bus>(bus: &B, pc: u16) -> Instruction {
    let at = |offset: u16| pc.wrapping_add(offset);
    match bus.peek(pc) {
        0xCB => decode_cb(bus.peek(at(1))),
        0xED => decode_ed(bus, pc),
        0xDD => decode_indexed(bus, pc, Prefix::Dd, Prefix::DdCb),
        0xFD => decode_indexed(bus, pc, Prefix::Fd, Prefix::FdCb),
        op => {
            let size = immediate_size(op);
            let operand = match size {
                2 => peek_word(bus, at(1)),
                1 => u16::from(bus.peek(at(1))),
                _ => 0,
            };
            Instruction {
                prefix: Prefix::None,
                opcode: op,
                displacement: 0,
                operand,
                length: 1 + size,
                cycles: u32::from(UNPREFIXED_CYCLES[usize::from(op)]),
                extra_cycles: unprefixed_extra(op),
                memptr: UNPREFIXED_RULES[usize::from(op)],
            }
        }
    }
}

fn decode_cb(op: u8) -> Instruction {
    let cycles = match (op & 0x07, op >> 6) {
        (6, 1) => 12,
        (6, _) => 15,
        _ => 8,
    };
    Instruction {
        prefix: Prefix::Cb,
        opcode: op,
        displacement: 0,
        operand: 0,
        length: 2,
        cycles,
        extra_cycles: 0,
        memptr: MemptrRule::Unchanged,
    }
}

fn decode_ed<B: Bus>(bus: &B, pc: u16) -> Instruction {
    let op = bus.peek(pc.wrapping_add(1));
    let (operand, length) = if op & 0xC7 == 0x43 {
        (peek_word(bus, pc.wrapping_add(2)), 4)
    } else {
        (0, 2)
    };
    let repeats = matches!(op, 0xB0..=0xB3 | 0xB8..=0xBB);
    Instruction {
        prefix: Prefix::Ed,
        opcode: op,
        displacement: 0,
        operand,
        length,
        cycles: ed_cycles(op),
        extra_cycles: if repeats { 5 } else { 0 },
        memptr: ED_RULES[usize::from(op)],
    }
}

fn decode_indexed<B: Bus>(bus: &B, pc: u16, prefix: Prefix, bit_prefix: Prefix) -> Instruction {
    let at = |offset: u16| pc.wrapping_add(offset);
    match bus.peek(at(1)) {
        // The prefix acts alone; the next byte starts a new instruction.
        0xDD | 0xFD | 0xED => Instruction {
            prefix: Prefix::None,
            opcode: 0x00,
            displacement: 0,
            operand: 0,
            length: 1,
            cycles: 4,
            extra_cycles: 0,
            memptr: MemptrRule::Unchanged,
        },
        0xCB => {
            let op = bus.peek(at(3));
            Instruction {
                prefix: bit_prefix,
                opcode: op,
                displacement: bus.peek(at(2)) as i8,
                operand: 0,
                length: 4,
                cycles: if op & 0xC0 == 0x40 { 20 } else { 23 },
                extra_cycles: 0,
                memptr: MemptrRule::IndexedAddress,
            }
        }
        op if uses_hl_memory(op) => {
            let displacement = bus.peek(at(2)) as i8;
            // LD (IX+d),n is the only indexed form with an immediate.
            let (operand, length, penalty) = if op == 0x36 {
                (u16::from(bus.peek(at(3))), 4, 5)
            } else {
                (0, 3, 8)
            };
            Instruction {
                prefix,
                opcode: op,
                displacement,
                operand,
                length,
                cycles: u32::from(UNPREFIXED_CYCLES[usize::from(op)]) + 4 + penalty,
                extra_cycles: 0,
                memptr: MemptrRule::IndexedAddress,
            }
        }
        op => {
            let size = immediate_size(op);
            let operand = match size {
                2 => peek_word(bus, at(2)),
                1 => u16::from(bus.peek(at(2))),
                _ => 0,
            };
            Instruction {
                prefix,
                opcode: op,
                displacement: 0,
                operand,
                length: 2 + size,
                cycles: u32::from(UNPREFIXED_CYCLES[usize::from(op)]) + 4,
                extra_cycles: unprefixed_extra(op),
                memptr: UNPREFIXED_RULES[usize::from(op)],
            }
        }
    }
}
