//! Opcode semantics for every prefix page.
//!
//! Each handler updates registers and the bus, and records in
//! [`MemptrInputs`] whatever the instruction's MEMPTR rule will need. PC
//! already points past the instruction when a handler runs.

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.
#![allow(clippy::cast_possible_wrap)] // Intentional i8 casts for displacements.

use emu_core::IoBus;

use super::{Z80, read16, write16};
use crate::alu::{
    accumulator_op, adc16, add16, bit_test, daa, dec8, inc8, rotate_shift, sbc16, sub8,
};
use crate::decode::{IndexRegister, Instruction, Prefix, is_defined_ed};
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, flag_if, parity, sz53, sz53p};
use crate::memptr::MemptrInputs;

impl Z80 {
    pub(super) fn execute<B: IoBus>(
        &mut self,
        bus: &mut B,
        instr: &Instruction,
        io: &mut MemptrInputs,
    ) {
        match instr.prefix {
            Prefix::None | Prefix::Dd | Prefix::Fd => self.execute_main(bus, instr, io),
            Prefix::Cb => self.execute_cb(bus, instr.opcode),
            Prefix::Ed => self.execute_ed(bus, instr, io),
            Prefix::DdCb | Prefix::FdCb => self.execute_index_cb(bus, instr, io),
        }
    }

    /// Address of the `(HL)` operand: HL, or IX/IY plus displacement.
    fn memory_operand(&self, instr: &Instruction, io: &mut MemptrInputs) -> u16 {
        let address = if instr.is_indexed_memory() {
            self.hl_or(instr.index())
                .wrapping_add_signed(i16::from(instr.displacement))
        } else {
            self.regs.hl()
        };
        io.address = address;
        address
    }

    /// Operand by 3-bit code, where 6 is the memory operand.
    fn read_operand<B: IoBus>(
        &mut self,
        bus: &mut B,
        instr: &Instruction,
        io: &mut MemptrInputs,
        code: u8,
    ) -> u8 {
        if code == 6 {
            let address = self.memory_operand(instr, io);
            bus.read(address)
        } else {
            self.reg8(code, halves(instr))
        }
    }

    fn write_operand<B: IoBus>(
        &mut self,
        bus: &mut B,
        instr: &Instruction,
        io: &mut MemptrInputs,
        code: u8,
        value: u8,
    ) {
        if code == 6 {
            let address = self.memory_operand(instr, io);
            bus.write(address, value);
        } else {
            self.set_reg8(code, halves(instr), value);
        }
    }

    fn relative_jump(&mut self, instr: &Instruction, io: &mut MemptrInputs, taken: bool) {
        let target = self
            .regs
            .pc
            .wrapping_add_signed(i16::from(instr.imm8() as i8));
        io.address = target;
        if taken {
            self.regs.pc = target;
            io.taken = true;
        }
    }

    fn ret<B: IoBus>(&mut self, bus: &mut B, io: &mut MemptrInputs) {
        let target = self.pop16(bus);
        self.regs.pc = target;
        io.address = target;
        io.taken = true;
    }

    fn call<B: IoBus>(&mut self, bus: &mut B, target: u16, io: &mut MemptrInputs) {
        let pc = self.regs.pc;
        self.push16(bus, pc);
        self.regs.pc = target;
        io.taken = true;
    }

    /// Unprefixed page, also used for DD and FD.
    fn execute_main<B: IoBus>(&mut self, bus: &mut B, instr: &Instruction, io: &mut MemptrInputs) {
        let op = instr.opcode;
        let index = instr.index();
        let y = (op >> 3) & 7;
        let z = op & 7;
        let p = y >> 1;
        let carry = self.regs.f & CF != 0;

        match op {
            0x00 => {} // NOP
            0x08 => self.regs.exchange_af(),
            0x10 => {
                // DJNZ d
                self.regs.b = self.regs.b.wrapping_sub(1);
                let taken = self.regs.b != 0;
                self.relative_jump(instr, io, taken);
            }
            0x18 => self.relative_jump(instr, io, true),
            0x20 | 0x28 | 0x30 | 0x38 => {
                let taken = self.condition(y - 4);
                self.relative_jump(instr, io, taken);
            }
            0x01 | 0x11 | 0x21 | 0x31 => self.set_rp(p, index, instr.imm16()),
            0x09 | 0x19 | 0x29 | 0x39 => {
                // ADD HL, rp
                let left = self.hl_or(index);
                let (result, flags) = add16(left, self.rp(p, index));
                self.set_hl_or(index, result);
                self.regs.f = (self.regs.f & (SF | ZF | PF)) | flags;
                io.pair = left;
            }
            0x02 | 0x12 => {
                // LD (BC), A / LD (DE), A
                let address = self.rp(p, None);
                bus.write(address, self.regs.a);
                io.address = address;
            }
            0x0A | 0x1A => {
                // LD A, (BC) / LD A, (DE)
                let address = self.rp(p, None);
                self.regs.a = bus.read(address);
                io.address = address;
            }
            0x22 => {
                // LD (nn), HL
                let address = instr.imm16();
                write16(bus, address, self.hl_or(index));
                io.address = address;
            }
            0x2A => {
                // LD HL, (nn)
                let address = instr.imm16();
                let value = read16(bus, address);
                self.set_hl_or(index, value);
                io.address = address;
            }
            0x32 => {
                // LD (nn), A
                let address = instr.imm16();
                bus.write(address, self.regs.a);
                io.address = address;
            }
            0x3A => {
                // LD A, (nn)
                let address = instr.imm16();
                self.regs.a = bus.read(address);
                io.address = address;
            }
            0x03 | 0x13 | 0x23 | 0x33 => {
                let value = self.rp(p, index).wrapping_add(1);
                self.set_rp(p, index, value);
            }
            0x0B | 0x1B | 0x2B | 0x3B => {
                let value = self.rp(p, index).wrapping_sub(1);
                self.set_rp(p, index, value);
            }
            op if op & 0xC7 == 0x04 => {
                // INC r
                let result = inc8(self.read_operand(bus, instr, io, y));
                self.write_operand(bus, instr, io, y, result.value);
                self.regs.f = result.flags | flag_if(carry, CF);
            }
            op if op & 0xC7 == 0x05 => {
                // DEC r
                let result = dec8(self.read_operand(bus, instr, io, y));
                self.write_operand(bus, instr, io, y, result.value);
                self.regs.f = result.flags | flag_if(carry, CF);
            }
            op if op & 0xC7 == 0x06 => self.write_operand(bus, instr, io, y, instr.imm8()),
            0x07 => {
                // RLCA
                let a = self.regs.a.rotate_left(1);
                self.regs.a = a;
                self.regs.f = (self.regs.f & (SF | ZF | PF)) | (a & (YF | XF | CF));
            }
            0x0F => {
                // RRCA
                let a = self.regs.a.rotate_right(1);
                self.regs.a = a;
                self.regs.f =
                    (self.regs.f & (SF | ZF | PF)) | (a & (YF | XF)) | flag_if(a & 0x80 != 0, CF);
            }
            0x17 => {
                // RLA
                let old = self.regs.a;
                let a = (old << 1) | u8::from(carry);
                self.regs.a = a;
                self.regs.f =
                    (self.regs.f & (SF | ZF | PF)) | (a & (YF | XF)) | flag_if(old & 0x80 != 0, CF);
            }
            0x1F => {
                // RRA
                let old = self.regs.a;
                let a = (old >> 1) | (u8::from(carry) << 7);
                self.regs.a = a;
                self.regs.f =
                    (self.regs.f & (SF | ZF | PF)) | (a & (YF | XF)) | flag_if(old & 0x01 != 0, CF);
            }
            0x27 => {
                let result = daa(self.regs.a, self.regs.f);
                self.regs.a = result.value;
                self.regs.f = result.flags;
            }
            0x2F => {
                // CPL
                let a = !self.regs.a;
                self.regs.a = a;
                self.regs.f = (self.regs.f & (SF | ZF | PF | CF)) | HF | NF | (a & (YF | XF));
            }
            0x37 => {
                // SCF
                self.regs.f = (self.regs.f & (SF | ZF | PF)) | (self.regs.a & (YF | XF)) | CF;
            }
            0x3F => {
                // CCF
                self.regs.f = (self.regs.f & (SF | ZF | PF))
                    | (self.regs.a & (YF | XF))
                    | flag_if(carry, HF)
                    | flag_if(!carry, CF);
            }
            0x76 => self.regs.halted = true,
            0x40..=0x7F => {
                // LD r, r'
                let value = self.read_operand(bus, instr, io, z);
                self.write_operand(bus, instr, io, y, value);
            }
            0x80..=0xBF => {
                let value = self.read_operand(bus, instr, io, z);
                let result = accumulator_op(y, self.regs.a, value, carry);
                self.regs.a = result.value;
                self.regs.f = result.flags;
            }
            op if op & 0xC7 == 0xC0 => {
                // RET cc
                if self.condition(y) {
                    self.ret(bus, io);
                }
            }
            op if op & 0xCF == 0xC1 => {
                // POP rp
                let value = self.pop16(bus);
                self.set_rp2(p, index, value);
            }
            0xC9 => self.ret(bus, io),
            0xD9 => self.regs.exchange_main(),
            0xE9 => self.regs.pc = self.hl_or(index),
            0xF9 => self.regs.sp = self.hl_or(index),
            op if op & 0xC7 == 0xC2 => {
                // JP cc, nn
                let target = instr.imm16();
                io.address = target;
                if self.condition(y) {
                    self.regs.pc = target;
                    io.taken = true;
                }
            }
            0xC3 => {
                let target = instr.imm16();
                io.address = target;
                self.regs.pc = target;
            }
            0xD3 => {
                // OUT (n), A
                let n = instr.imm8();
                let port = (u16::from(self.regs.a) << 8) | u16::from(n);
                bus.write_io(port, self.regs.a);
                io.address = u16::from(n);
            }
            0xDB => {
                // IN A, (n)
                let port = (u16::from(self.regs.a) << 8) | u16::from(instr.imm8());
                self.regs.a = bus.read_io(port);
                io.address = port;
            }
            0xE3 => {
                // EX (SP), HL
                let sp = self.regs.sp;
                let value = read16(bus, sp);
                write16(bus, sp, self.hl_or(index));
                self.set_hl_or(index, value);
                io.pair = value;
            }
            0xEB => {
                // EX DE, HL never sees the index prefix.
                let de = self.regs.de();
                self.regs.set_de(self.regs.hl());
                self.regs.set_hl(de);
            }
            0xF3 => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
            }
            0xFB => {
                self.regs.iff1 = true;
                self.regs.iff2 = true;
                self.interrupts.defer_one_instruction();
            }
            op if op & 0xC7 == 0xC4 => {
                // CALL cc, nn
                let target = instr.imm16();
                io.address = target;
                if self.condition(y) {
                    self.call(bus, target, io);
                }
            }
            op if op & 0xCF == 0xC5 => {
                // PUSH rp
                let value = self.rp2(p, index);
                self.push16(bus, value);
            }
            0xCD => {
                let target = instr.imm16();
                io.address = target;
                self.call(bus, target, io);
            }
            op if op & 0xC7 == 0xC6 => {
                // ALU A, n
                let result = accumulator_op(y, self.regs.a, instr.imm8(), carry);
                self.regs.a = result.value;
                self.regs.f = result.flags;
            }
            op if op & 0xC7 == 0xC7 => {
                // RST p
                let target = u16::from(op & 0x38);
                io.address = target;
                self.call(bus, target, io);
            }
            // Prefix bytes are consumed by the decoder.
            _ => {}
        }
    }

    fn execute_cb<B: IoBus>(&mut self, bus: &mut B, op: u8) {
        let bit = (op >> 3) & 7;
        let code = op & 7;
        let hl = self.regs.hl();
        let value = if code == 6 {
            bus.read(hl)
        } else {
            self.reg8(code, None)
        };
        let carry = self.regs.f & CF != 0;

        let result = match op >> 6 {
            0 => {
                let result = rotate_shift(bit, value, carry);
                self.regs.f = result.flags;
                result.value
            }
            1 => {
                // BIT n,(HL) exposes MEMPTR's high byte through X and Y.
                let xy = if code == 6 {
                    (self.regs.wz >> 8) as u8
                } else {
                    value
                };
                self.regs.f = bit_test(bit, value, xy, carry);
                return;
            }
            2 => value & !(1 << bit),
            _ => value | (1 << bit),
        };

        if code == 6 {
            bus.write(hl, result);
        } else {
            self.set_reg8(code, None, result);
        }
    }

    /// DD CB d op / FD CB d op.
    fn execute_index_cb<B: IoBus>(
        &mut self,
        bus: &mut B,
        instr: &Instruction,
        io: &mut MemptrInputs,
    ) {
        let op = instr.opcode;
        let bit = (op >> 3) & 7;
        let code = op & 7;
        let address = self.memory_operand(instr, io);
        let value = bus.read(address);
        let carry = self.regs.f & CF != 0;

        let result = match op >> 6 {
            0 => {
                let result = rotate_shift(bit, value, carry);
                self.regs.f = result.flags;
                result.value
            }
            1 => {
                self.regs.f = bit_test(bit, value, (address >> 8) as u8, carry);
                return;
            }
            2 => value & !(1 << bit),
            _ => value | (1 << bit),
        };

        bus.write(address, result);
        // Undocumented: non-(HL) encodings also copy the result to a register.
        if code != 6 {
            self.set_reg8(code, None, result);
        }
    }

    fn execute_ed<B: IoBus>(&mut self, bus: &mut B, instr: &Instruction, io: &mut MemptrInputs) {
        let op = instr.opcode;
        if !is_defined_ed(op) {
            log::debug!("Undefined opcode ED {op:02X} at {:04X}, executed as NOP", io.pc);
            return;
        }
        let y = (op >> 3) & 7;
        let p = y >> 1;
        let carry = self.regs.f & CF != 0;

        match op {
            0x40..=0x7F => match op & 7 {
                0 => {
                    // IN r, (C); IN (C) only sets flags
                    let bc = self.regs.bc();
                    let value = bus.read_io(bc);
                    if y != 6 {
                        self.set_reg8(y, None, value);
                    }
                    self.regs.f = sz53p(value) | flag_if(carry, CF);
                    io.pair = bc;
                }
                1 => {
                    // OUT (C), r; OUT (C), 0
                    let bc = self.regs.bc();
                    let value = if y == 6 { 0 } else { self.reg8(y, None) };
                    bus.write_io(bc, value);
                    io.pair = bc;
                }
                2 => {
                    let hl = self.regs.hl();
                    let rhs = self.rp(p, None);
                    let (result, flags) = if op & 0x08 == 0 {
                        sbc16(hl, rhs, carry)
                    } else {
                        adc16(hl, rhs, carry)
                    };
                    self.regs.set_hl(result);
                    self.regs.f = flags;
                    io.pair = hl;
                }
                3 => {
                    let address = instr.imm16();
                    if op & 0x08 == 0 {
                        write16(bus, address, self.rp(p, None));
                    } else {
                        let value = read16(bus, address);
                        self.set_rp(p, None, value);
                    }
                    io.address = address;
                }
                4 => {
                    // NEG
                    let result = sub8(0, self.regs.a, false);
                    self.regs.a = result.value;
                    self.regs.f = result.flags;
                }
                5 => {
                    // RETN / RETI
                    self.regs.iff1 = self.regs.iff2;
                    self.ret(bus, io);
                }
                6 => {
                    self.regs.im = match y & 3 {
                        0 | 1 => 0,
                        2 => 1,
                        _ => 2,
                    };
                }
                _ => match y {
                    0 => self.regs.i = self.regs.a,
                    1 => self.regs.r = self.regs.a,
                    2 | 3 => {
                        // LD A, I / LD A, R
                        let a = if y == 2 { self.regs.i } else { self.regs.r };
                        self.regs.a = a;
                        self.regs.f = sz53(a) | flag_if(self.regs.iff2, PF) | flag_if(carry, CF);
                    }
                    4 => {
                        // RRD
                        let hl = self.regs.hl();
                        let m = bus.read(hl);
                        let a = self.regs.a;
                        bus.write(hl, (a << 4) | (m >> 4));
                        self.regs.a = (a & 0xF0) | (m & 0x0F);
                        self.regs.f = sz53p(self.regs.a) | flag_if(carry, CF);
                        io.pair = hl;
                    }
                    _ => {
                        // RLD
                        let hl = self.regs.hl();
                        let m = bus.read(hl);
                        let a = self.regs.a;
                        bus.write(hl, (m << 4) | (a & 0x0F));
                        self.regs.a = (a & 0xF0) | (m >> 4);
                        self.regs.f = sz53p(self.regs.a) | flag_if(carry, CF);
                        io.pair = hl;
                    }
                },
            },
            _ => self.block_op(bus, op, io),
        }
    }

    /// LDI/CPI/INI/OUTI and their decrementing and repeating forms.
    fn block_op<B: IoBus>(&mut self, bus: &mut B, op: u8, io: &mut MemptrInputs) {
        let decrement = op & 0x08 != 0;
        let repeat = op & 0x10 != 0;
        let step = |value: u16| {
            if decrement {
                value.wrapping_sub(1)
            } else {
                value.wrapping_add(1)
            }
        };
        let hl = self.regs.hl();

        let again = match op & 3 {
            0 => {
                let value = bus.read(hl);
                let de = self.regs.de();
                bus.write(de, value);
                self.regs.set_hl(step(hl));
                self.regs.set_de(step(de));
                let bc = self.regs.bc().wrapping_sub(1);
                self.regs.set_bc(bc);
                let n = value.wrapping_add(self.regs.a);
                self.regs.f = (self.regs.f & (SF | ZF | CF))
                    | flag_if(bc != 0, PF)
                    | (n & XF)
                    | flag_if(n & 0x02 != 0, YF);
                bc != 0
            }
            1 => {
                let value = bus.read(hl);
                let diff = sub8(self.regs.a, value, false);
                self.regs.set_hl(step(hl));
                let bc = self.regs.bc().wrapping_sub(1);
                self.regs.set_bc(bc);
                let n = diff.value.wrapping_sub(u8::from(diff.flags & HF != 0));
                self.regs.f = (diff.flags & (SF | ZF | HF))
                    | NF
                    | (self.regs.f & CF)
                    | flag_if(bc != 0, PF)
                    | (n & XF)
                    | flag_if(n & 0x02 != 0, YF);
                bc != 0 && diff.value != 0
            }
            2 => {
                let bc = self.regs.bc();
                io.pair = bc;
                let value = bus.read_io(bc);
                bus.write(hl, value);
                self.regs.b = self.regs.b.wrapping_sub(1);
                self.regs.set_hl(step(hl));
                let c = step(u16::from(self.regs.c)) as u8;
                self.regs.f = self.io_block_flags(value, c);
                self.regs.b != 0
            }
            _ => {
                let value = bus.read(hl);
                self.regs.b = self.regs.b.wrapping_sub(1);
                let bc = self.regs.bc();
                io.pair = bc;
                bus.write_io(bc, value);
                self.regs.set_hl(step(hl));
                self.regs.f = self.io_block_flags(value, self.regs.l);
                self.regs.b != 0
            }
        };

        if repeat && again {
            self.regs.pc = self.regs.pc.wrapping_sub(2);
            io.taken = true;
        }
    }

    fn io_block_flags(&self, value: u8, addend: u8) -> u8 {
        let b = self.regs.b;
        let k = u16::from(value) + u16::from(addend);
        sz53(b)
            | flag_if(value & 0x80 != 0, NF)
            | flag_if(k > 0xFF, HF | CF)
            | flag_if(parity((k as u8 & 7) ^ b), PF)
    }
}

/// Register set used for 8-bit H/L operands: the index halves, unless the
/// instruction also addresses `(IX+d)`.
fn halves(instr: &Instruction) -> Option<IndexRegister> {
    if instr.is_indexed_memory() {
        None
    } else {
        instr.index()
    }
}
