//! Z80 CPU core, one whole instruction per step.

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.

mod execute;

use emu_core::{Bus, Cpu, IoBus, Observable, Ticks, Value};

use crate::config::Z80Config;
use crate::decode::{IndexRegister, Prefix, decode};
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
use crate::interrupt::{InterruptController, InterruptKind};
use crate::memptr::{MemptrInputs, MemptrRule, MemptrTable};
use crate::registers::{Register, Registers};

/// T-states for an accepted NMI.
const NMI_CYCLES: u32 = 11;
/// T-states for an accepted IM 0 or IM 1 interrupt.
const IM1_CYCLES: u32 = 13;
/// T-states for an accepted IM 2 interrupt.
const IM2_CYCLES: u32 = 19;
/// T-states per step while halted.
const HALT_CYCLES: u32 = 4;

fn read16<B: Bus>(bus: &mut B, address: u16) -> u16 {
    let lo = bus.read(address);
    let hi = bus.read(address.wrapping_add(1));
    u16::from_le_bytes([lo, hi])
}

fn write16<B: Bus>(bus: &mut B, address: u16, value: u16) {
    let [lo, hi] = value.to_le_bytes();
    bus.write(address, lo);
    bus.write(address.wrapping_add(1), hi);
}

/// Z80 CPU.
///
/// The CPU does not own the bus; it is passed to [`Z80::step`] for each
/// instruction.
pub struct Z80 {
    pub(crate) regs: Registers,
    memptr: MemptrTable,
    interrupts: InterruptController,
    config: Z80Config,
    /// Total T-states elapsed.
    total_ticks: Ticks,
}

impl Z80 {
    /// Create a Z80 in its power-on state.
    #[must_use]
    pub fn new(config: Z80Config) -> Self {
        Self {
            regs: Registers::default(),
            memptr: MemptrTable::new(config.revision),
            interrupts: InterruptController::default(),
            config,
            total_ticks: Ticks::ZERO,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Z80Config {
        &self.config
    }

    /// Total T-states elapsed since creation.
    #[must_use]
    pub const fn total_ticks(&self) -> Ticks {
        self.total_ticks
    }

    #[must_use]
    pub fn regs(&self) -> &Registers {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    #[must_use]
    pub fn value(&self, register: Register) -> u16 {
        self.regs.get(register)
    }

    pub fn set_value(&mut self, register: Register, value: u16) {
        self.regs.set(register, value);
    }

    /// Raise INT; `data` is what the device puts on the bus during
    /// acknowledge.
    pub fn interrupt(&mut self, data: u8) {
        self.interrupts.request_irq(data);
    }

    /// Raise INT with the configured data bus byte.
    pub fn request_interrupt(&mut self) {
        self.interrupts.request_irq(self.config.interrupt_data_bus);
    }

    pub fn nmi(&mut self) {
        self.interrupts.request_nmi();
    }

    pub fn clear_interrupt(&mut self) {
        self.interrupts.clear_irq();
    }

    /// Execute one instruction, or accept one pending interrupt.
    ///
    /// Returns the T-states consumed.
    pub fn step<B: IoBus>(&mut self, bus: &mut B) -> u32 {
        let cycles = if let Some(kind) = self.interrupts.poll(self.regs.iff1) {
            self.accept_interrupt(bus, kind)
        } else if self.regs.halted {
            self.regs.advance_refresh(1);
            HALT_CYCLES
        } else {
            self.execute_next(bus)
        };
        self.total_ticks += Ticks::from(cycles);
        cycles
    }

    fn execute_next<B: IoBus>(&mut self, bus: &mut B) -> u32 {
        let pc = self.regs.pc;
        let instr = decode(bus, pc);
        if instr.prefix == Prefix::None && matches!(bus.peek(pc), 0xDD | 0xFD) {
            self.interrupts.hold_after_prefix();
        }
        self.regs.advance_refresh(instr.m1_fetches());
        self.regs.pc = pc.wrapping_add(u16::from(instr.length));

        let mut inputs = MemptrInputs {
            a: self.regs.a,
            pc,
            ..MemptrInputs::default()
        };
        self.execute(bus, &instr, &mut inputs);
        self.regs.wz = self.memptr.apply(instr.memptr, &inputs, self.regs.wz);

        if inputs.taken {
            instr.cycles + instr.extra_cycles
        } else {
            instr.cycles
        }
    }

    fn accept_interrupt<B: IoBus>(&mut self, bus: &mut B, kind: InterruptKind) -> u32 {
        self.regs.halted = false;
        self.regs.advance_refresh(1);

        let (target, cycles) = match kind {
            InterruptKind::Nmi => {
                self.regs.iff1 = false;
                (0x0066, NMI_CYCLES)
            }
            InterruptKind::Maskable(data) => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
                match self.regs.im {
                    0 => {
                        // Only RST opcodes are meaningful on the bus here.
                        let target = if data & 0xC7 == 0xC7 {
                            u16::from(data & 0x38)
                        } else {
                            0x0038
                        };
                        (target, IM1_CYCLES)
                    }
                    1 => (0x0038, IM1_CYCLES),
                    _ => {
                        let vector = (u16::from(self.regs.i) << 8) | u16::from(data);
                        (read16(bus, vector), IM2_CYCLES)
                    }
                }
            }
        };
        log::trace!(
            "Z80 accepted {kind:?} in IM {} at PC={:04X}, vector {target:04X}",
            self.regs.im,
            self.regs.pc
        );

        let pc = self.regs.pc;
        self.push16(bus, pc);
        self.regs.pc = target;
        let inputs = MemptrInputs {
            address: target,
            pc,
            ..MemptrInputs::default()
        };
        self.regs.wz = self.memptr.apply(MemptrRule::Target, &inputs, self.regs.wz);
        cycles
    }

    fn push16<B: IoBus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, lo);
    }

    fn pop16<B: IoBus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    /// Condition code `cc` (0-7): NZ, Z, NC, C, PO, PE, P, M.
    fn condition(&self, cc: u8) -> bool {
        let f = self.regs.f;
        match cc & 7 {
            0 => f & ZF == 0,
            1 => f & ZF != 0,
            2 => f & CF == 0,
            3 => f & CF != 0,
            4 => f & PF == 0,
            5 => f & PF != 0,
            6 => f & SF == 0,
            _ => f & SF != 0,
        }
    }

    /// HL, or the index register a DD/FD prefix substitutes for it.
    fn hl_or(&self, index: Option<IndexRegister>) -> u16 {
        match index {
            None => self.regs.hl(),
            Some(IndexRegister::Ix) => self.regs.ix,
            Some(IndexRegister::Iy) => self.regs.iy,
        }
    }

    fn set_hl_or(&mut self, index: Option<IndexRegister>, value: u16) {
        match index {
            None => self.regs.set_hl(value),
            Some(IndexRegister::Ix) => self.regs.ix = value,
            Some(IndexRegister::Iy) => self.regs.iy = value,
        }
    }

    /// 8-bit register by its 3-bit code (6 is not a register). Under an
    /// index prefix H and L name the index register halves.
    fn reg8(&self, code: u8, index: Option<IndexRegister>) -> u8 {
        match code & 7 {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => (self.hl_or(index) >> 8) as u8,
            5 => self.hl_or(index) as u8,
            _ => self.regs.a,
        }
    }

    fn set_reg8(&mut self, code: u8, index: Option<IndexRegister>, value: u8) {
        match code & 7 {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => {
                let pair = self.hl_or(index);
                self.set_hl_or(index, (pair & 0x00FF) | (u16::from(value) << 8));
            }
            5 => {
                let pair = self.hl_or(index);
                self.set_hl_or(index, (pair & 0xFF00) | u16::from(value));
            }
            _ => self.regs.a = value,
        }
    }

    /// Register pair by its 2-bit code: BC, DE, HL (or index), SP.
    fn rp(&self, code: u8, index: Option<IndexRegister>) -> u16 {
        match code & 3 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.hl_or(index),
            _ => self.regs.sp,
        }
    }

    fn set_rp(&mut self, code: u8, index: Option<IndexRegister>, value: u16) {
        match code & 3 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.set_hl_or(index, value),
            _ => self.regs.sp = value,
        }
    }

    /// As [`Self::rp`] but with AF in place of SP, for PUSH and POP.
    fn rp2(&self, code: u8, index: Option<IndexRegister>) -> u16 {
        if code & 3 == 3 {
            self.regs.af()
        } else {
            self.rp(code, index)
        }
    }

    fn set_rp2(&mut self, code: u8, index: Option<IndexRegister>, value: u16) {
        if code & 3 == 3 {
            self.regs.set_af(value);
        } else {
            self.set_rp(code, index, value);
        }
    }
}

impl<B: IoBus> Cpu<B> for Z80 {
    type Registers = Registers;

    fn step(&mut self, bus: &mut B) -> u32 {
        Z80::step(self, bus)
    }

    fn reset(&mut self) {
        self.regs = Registers::default();
        self.interrupts.reset();
    }

    fn interrupt(&mut self, data: u8) {
        Z80::interrupt(self, data);
    }

    fn nmi(&mut self) {
        Z80::nmi(self);
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }
}

#[rustfmt::skip]
const Z80_QUERY_PATHS: &[&str] = &[
    // Main registers
    "a", "f", "b", "c", "d", "e", "h", "l",
    // Register pairs
    "af", "bc", "de", "hl",
    // Alternate pairs
    "af'", "bc'", "de'", "hl'",
    // Index registers
    "ix", "iy", "ixh", "ixl", "iyh", "iyl",
    // Other registers
    "sp", "pc", "i", "r", "ir",
    // Internal latch, under both of its names
    "wz", "memptr",
    // Flags (individual)
    "flags.s", "flags.z", "flags.y", "flags.h",
    "flags.x", "flags.p", "flags.n", "flags.c",
    // Interrupt state
    "iff1", "iff2", "im", "int_pending", "nmi_pending",
    // CPU state
    "halted", "ticks",
];

impl Observable for Z80 {
    fn query(&self, path: &str) -> Option<Value> {
        let regs = &self.regs;
        match path {
            "a" => Some(regs.a.into()),
            "f" => Some(regs.f.into()),
            "b" => Some(regs.b.into()),
            "c" => Some(regs.c.into()),
            "d" => Some(regs.d.into()),
            "e" => Some(regs.e.into()),
            "h" => Some(regs.h.into()),
            "l" => Some(regs.l.into()),

            "af" => Some(regs.af().into()),
            "bc" => Some(regs.bc().into()),
            "de" => Some(regs.de().into()),
            "hl" => Some(regs.hl().into()),

            "af'" => Some(regs.get(Register::AFAlt).into()),
            "bc'" => Some(regs.get(Register::BCAlt).into()),
            "de'" => Some(regs.get(Register::DEAlt).into()),
            "hl'" => Some(regs.get(Register::HLAlt).into()),

            "ix" => Some(regs.ix.into()),
            "iy" => Some(regs.iy.into()),
            "ixh" => Some(((regs.ix >> 8) as u8).into()),
            "ixl" => Some((regs.ix as u8).into()),
            "iyh" => Some(((regs.iy >> 8) as u8).into()),
            "iyl" => Some((regs.iy as u8).into()),

            "sp" => Some(regs.sp.into()),
            "pc" => Some(regs.pc.into()),
            "i" => Some(regs.i.into()),
            "r" => Some(regs.r.into()),
            "ir" => Some(regs.ir().into()),

            "wz" | "memptr" => Some(regs.wz.into()),

            "flags.s" => Some((regs.f & SF != 0).into()),
            "flags.z" => Some((regs.f & ZF != 0).into()),
            "flags.y" => Some((regs.f & YF != 0).into()),
            "flags.h" => Some((regs.f & HF != 0).into()),
            "flags.x" => Some((regs.f & XF != 0).into()),
            "flags.p" => Some((regs.f & PF != 0).into()),
            "flags.n" => Some((regs.f & NF != 0).into()),
            "flags.c" => Some((regs.f & CF != 0).into()),

            "iff1" => Some(regs.iff1.into()),
            "iff2" => Some(regs.iff2.into()),
            "im" => Some(regs.im.into()),
            "int_pending" => Some(self.interrupts.irq_pending().into()),
            "nmi_pending" => Some(self.interrupts.nmi_pending().into()),

            "halted" => Some(regs.halted.into()),
            "ticks" => Some(self.total_ticks.get().into()),

            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        Z80_QUERY_PATHS
    }
}
