//! MEMPTR (WZ) update rules.
//!
//! Every instruction carries exactly one [`MemptrRule`]. The engine records
//! the values a rule may need in [`MemptrInputs`] while it executes, then
//! hands both to [`MemptrTable::apply`]. Rules for the unprefixed and ED
//! pages live in static 256-entry tables; CB instructions never touch
//! MEMPTR and every DD CB / FD CB instruction uses [`MemptrRule::IndexedAddress`].

#![allow(clippy::cast_possible_truncation)]

use crate::config::Revision;

/// Block instruction direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increment,
    Decrement,
}

impl Direction {
    const fn step(self, value: u16) -> u16 {
        match self {
            Direction::Increment => value.wrapping_add(1),
            Direction::Decrement => value.wrapping_sub(1),
        }
    }
}

/// How an instruction updates MEMPTR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemptrRule {
    /// MEMPTR keeps its value.
    Unchanged,
    /// Operand address + 1 (`LD A,(nn)`, `LD rp,(nn)`, `IN A,(n)`).
    AddressPlusOne,
    /// Low byte `(address + 1) & 0xFF`, high byte from A or zero depending
    /// on the revision (`LD (nn),A`, `LD (BC),A`, `OUT (n),A`).
    AccumulatorMix,
    /// Register pair + 1 (`ADD HL,rp`, `IN r,(C)`, `RLD`).
    PairPlusOne,
    /// The register pair's new value (`EX (SP),HL`).
    PairValue,
    /// The jump target, whether or not the jump happens.
    Target,
    /// The jump target, only when the jump happens.
    TargetIfTaken,
    /// MEMPTR + 1 (`CPI`).
    Increment,
    /// MEMPTR - 1 (`CPD`).
    Decrement,
    /// `CPIR`/`CPDR`: PC + 1 while repeating, otherwise as `CPI`/`CPD`.
    CompareRepeat(Direction),
    /// `LDIR`/`LDDR`: PC + 1 while repeating, otherwise unchanged.
    TransferRepeat,
    /// `INI`/`OUTI` family: the BC value the engine recorded, +/- 1.
    IoBlock(Direction),
    /// `IX+d` / `IY+d`.
    IndexedAddress,
}

/// Values collected by the engine while executing one instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemptrInputs {
    /// Memory operand address, port, or jump target.
    pub address: u16,
    /// Accumulator as it was before the instruction.
    pub a: u8,
    /// The register pair the rule refers to.
    pub pair: u16,
    /// Address of the instruction's first byte.
    pub pc: u16,
    /// Conditional jump taken, or block instruction repeating.
    pub taken: bool,
}

/// Rule evaluator with the revision's store behaviour fixed in.
#[derive(Clone, Copy)]
pub struct MemptrTable {
    high_byte: fn(u8) -> u8,
    revision: Revision,
}

impl std::fmt::Debug for MemptrTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemptrTable")
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

fn accumulator_high(a: u8) -> u8 {
    a
}

fn cleared_high(_: u8) -> u8 {
    0
}

impl MemptrTable {
    #[must_use]
    pub fn new(revision: Revision) -> Self {
        let high_byte = match revision {
            Revision::Nmos => accumulator_high as fn(u8) -> u8,
            Revision::Bm1 => cleared_high,
        };
        Self {
            high_byte,
            revision,
        }
    }

    #[must_use]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// New MEMPTR value after an instruction with `rule` has executed.
    #[must_use]
    pub fn apply(&self, rule: MemptrRule, inputs: &MemptrInputs, current: u16) -> u16 {
        match rule {
            MemptrRule::Unchanged => current,
            MemptrRule::AddressPlusOne => inputs.address.wrapping_add(1),
            MemptrRule::AccumulatorMix => {
                let low = inputs.address.wrapping_add(1) & 0x00FF;
                (u16::from((self.high_byte)(inputs.a)) << 8) | low
            }
            MemptrRule::PairPlusOne => inputs.pair.wrapping_add(1),
            MemptrRule::PairValue => inputs.pair,
            MemptrRule::Target => inputs.address,
            MemptrRule::TargetIfTaken => {
                if inputs.taken {
                    inputs.address
                } else {
                    current
                }
            }
            MemptrRule::Increment => current.wrapping_add(1),
            MemptrRule::Decrement => current.wrapping_sub(1),
            MemptrRule::CompareRepeat(direction) => {
                if inputs.taken {
                    inputs.pc.wrapping_add(1)
                } else {
                    direction.step(current)
                }
            }
            MemptrRule::TransferRepeat => {
                if inputs.taken {
                    inputs.pc.wrapping_add(1)
                } else {
                    current
                }
            }
            MemptrRule::IoBlock(direction) => direction.step(inputs.pair),
            MemptrRule::IndexedAddress => inputs.address,
        }
    }
}

const fn unprefixed_rule(op: u8) -> MemptrRule {
    match op {
        0x02 | 0x12 | 0x32 | 0xD3 => MemptrRule::AccumulatorMix,
        0x0A | 0x1A | 0x22 | 0x2A | 0x3A | 0xDB => MemptrRule::AddressPlusOne,
        0x09 | 0x19 | 0x29 | 0x39 => MemptrRule::PairPlusOne,
        0xE3 => MemptrRule::PairValue,
        // DJNZ, JR, JR cc
        0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => MemptrRule::TargetIfTaken,
        // RET cc, RET
        0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 | 0xC9 => {
            MemptrRule::TargetIfTaken
        }
        // JP cc, JP, CALL cc, CALL
        0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA | 0xC3 => MemptrRule::Target,
        0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC | 0xCD => MemptrRule::Target,
        // RST
        op if op & 0xC7 == 0xC7 => MemptrRule::Target,
        _ => MemptrRule::Unchanged,
    }
}

const fn ed_rule(op: u8) -> MemptrRule {
    match op {
        0x40..=0x7F => match op & 7 {
            0 | 1 | 2 => MemptrRule::PairPlusOne,
            3 => MemptrRule::AddressPlusOne,
            5 => MemptrRule::TargetIfTaken,
            7 if op == 0x67 || op == 0x6F => MemptrRule::PairPlusOne,
            _ => MemptrRule::Unchanged,
        },
        0xA1 => MemptrRule::Increment,
        0xA9 => MemptrRule::Decrement,
        0xB1 => MemptrRule::CompareRepeat(Direction::Increment),
        0xB9 => MemptrRule::CompareRepeat(Direction::Decrement),
        0xB0 | 0xB8 => MemptrRule::TransferRepeat,
        0xA2 | 0xA3 | 0xB2 | 0xB3 => MemptrRule::IoBlock(Direction::Increment),
        0xAA | 0xAB | 0xBA | 0xBB => MemptrRule::IoBlock(Direction::Decrement),
        _ => MemptrRule::Unchanged,
    }
}

const fn build_unprefixed() -> [MemptrRule; 256] {
    let mut table = [MemptrRule::Unchanged; 256];
    let mut op = 0;
    while op < 256 {
        table[op] = unprefixed_rule(op as u8);
        op += 1;
    }
    table
}

const fn build_ed() -> [MemptrRule; 256] {
    let mut table = [MemptrRule::Unchanged; 256];
    let mut op = 0;
    while op < 256 {
        table[op] = ed_rule(op as u8);
        op += 1;
    }
    table
}

/// Rules for unprefixed opcodes, also used by DD/FD forms without `(IX+d)`.
pub static UNPREFIXED_RULES: [MemptrRule; 256] = build_unprefixed();

/// Rules for ED-prefixed opcodes.
pub static ED_RULES: [MemptrRule; 256] = build_ed();
