//! Z80 register file.

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Z80 registers, including the internal WZ latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Registers {
    // Main registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    // Alternate registers
    pub a_alt: u8,
    pub f_alt: u8,
    pub b_alt: u8,
    pub c_alt: u8,
    pub d_alt: u8,
    pub e_alt: u8,
    pub h_alt: u8,
    pub l_alt: u8,

    // Index registers
    pub ix: u16,
    pub iy: u16,

    // Other registers
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,

    /// WZ/MEMPTR - internal address latch.
    /// Feeds the undocumented X/Y flags of `BIT n,(HL)`.
    pub wz: u16,

    // Interrupt state
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,

    pub halted: bool,
}

impl Default for Registers {
    /// Power-on state: everything clear except SP and AF, which real parts
    /// come up with set to all ones.
    fn default() -> Self {
        Self {
            a: 0xFF,
            f: 0xFF,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            a_alt: 0,
            f_alt: 0,
            b_alt: 0,
            c_alt: 0,
            d_alt: 0,
            e_alt: 0,
            h_alt: 0,
            l_alt: 0,
            ix: 0,
            iy: 0,
            sp: 0xFFFF,
            pc: 0,
            i: 0,
            r: 0,
            wz: 0,
            iff1: false,
            iff2: false,
            im: 0,
            halted: false,
        }
    }
}

const fn pair(hi: u8, lo: u8) -> u16 {
    (hi as u16) << 8 | lo as u16
}

const fn split(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, value as u8)
}

impl Registers {
    #[must_use]
    pub const fn af(&self) -> u16 {
        pair(self.a, self.f)
    }

    #[must_use]
    pub const fn bc(&self) -> u16 {
        pair(self.b, self.c)
    }

    #[must_use]
    pub const fn de(&self) -> u16 {
        pair(self.d, self.e)
    }

    #[must_use]
    pub const fn hl(&self) -> u16 {
        pair(self.h, self.l)
    }

    /// I in the high byte, R in the low byte.
    #[must_use]
    pub const fn ir(&self) -> u16 {
        pair(self.i, self.r)
    }

    pub fn set_af(&mut self, value: u16) {
        (self.a, self.f) = split(value);
    }

    pub fn set_bc(&mut self, value: u16) {
        (self.b, self.c) = split(value);
    }

    pub fn set_de(&mut self, value: u16) {
        (self.d, self.e) = split(value);
    }

    pub fn set_hl(&mut self, value: u16) {
        (self.h, self.l) = split(value);
    }

    /// `EX AF,AF'`
    pub fn exchange_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_alt);
        std::mem::swap(&mut self.f, &mut self.f_alt);
    }

    /// `EXX`
    pub fn exchange_main(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_alt);
        std::mem::swap(&mut self.c, &mut self.c_alt);
        std::mem::swap(&mut self.d, &mut self.d_alt);
        std::mem::swap(&mut self.e, &mut self.e_alt);
        std::mem::swap(&mut self.h, &mut self.h_alt);
        std::mem::swap(&mut self.l, &mut self.l_alt);
    }

    /// Advance the refresh counter. Bit 7 of R is never touched by refresh.
    pub fn advance_refresh(&mut self, fetches: u8) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(fetches) & 0x7F);
    }

    /// Read any register by name. 8-bit registers and flags are zero-extended.
    #[must_use]
    pub fn get(&self, register: Register) -> u16 {
        match register {
            Register::A => self.a.into(),
            Register::F => self.f.into(),
            Register::B => self.b.into(),
            Register::C => self.c.into(),
            Register::D => self.d.into(),
            Register::E => self.e.into(),
            Register::H => self.h.into(),
            Register::L => self.l.into(),
            Register::AF => self.af(),
            Register::BC => self.bc(),
            Register::DE => self.de(),
            Register::HL => self.hl(),
            Register::AFAlt => pair(self.a_alt, self.f_alt),
            Register::BCAlt => pair(self.b_alt, self.c_alt),
            Register::DEAlt => pair(self.d_alt, self.e_alt),
            Register::HLAlt => pair(self.h_alt, self.l_alt),
            Register::IX => self.ix,
            Register::IY => self.iy,
            Register::SP => self.sp,
            Register::PC => self.pc,
            Register::I => self.i.into(),
            Register::R => self.r.into(),
            Register::IR => self.ir(),
            Register::MemPtr => self.wz,
            Register::IFF1 => self.iff1.into(),
            Register::IFF2 => self.iff2.into(),
            Register::IM => self.im.into(),
        }
    }

    /// Write any register by name. 8-bit registers take the low byte;
    /// IFF1/IFF2 treat any non-zero value as set; IM is masked to 0-2.
    pub fn set(&mut self, register: Register, value: u16) {
        let byte = value as u8;
        match register {
            Register::A => self.a = byte,
            Register::F => self.f = byte,
            Register::B => self.b = byte,
            Register::C => self.c = byte,
            Register::D => self.d = byte,
            Register::E => self.e = byte,
            Register::H => self.h = byte,
            Register::L => self.l = byte,
            Register::AF => self.set_af(value),
            Register::BC => self.set_bc(value),
            Register::DE => self.set_de(value),
            Register::HL => self.set_hl(value),
            Register::AFAlt => (self.a_alt, self.f_alt) = split(value),
            Register::BCAlt => (self.b_alt, self.c_alt) = split(value),
            Register::DEAlt => (self.d_alt, self.e_alt) = split(value),
            Register::HLAlt => (self.h_alt, self.l_alt) = split(value),
            Register::IX => self.ix = value,
            Register::IY => self.iy = value,
            Register::SP => self.sp = value,
            Register::PC => self.pc = value,
            Register::I => self.i = byte,
            Register::R => self.r = byte,
            Register::IR => (self.i, self.r) = split(value),
            Register::MemPtr => self.wz = value,
            Register::IFF1 => self.iff1 = value != 0,
            Register::IFF2 => self.iff2 = value != 0,
            Register::IM => self.im = byte.min(2),
        }
    }
}

/// Register selector for the driver-facing `value`/`set_value` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Register {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    AF,
    BC,
    DE,
    HL,
    AFAlt,
    BCAlt,
    DEAlt,
    HLAlt,
    IX,
    IY,
    SP,
    PC,
    I,
    R,
    IR,
    /// The internal WZ latch.
    MemPtr,
    IFF1,
    IFF2,
    IM,
}
