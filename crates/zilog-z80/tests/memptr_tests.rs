//! MEMPTR (WZ) behaviour, instruction by instruction.

use zilog_z80::{Register, Revision, TestMachine, Z80Config, ZF};

/// Machine with `code` at 0x0000 and PC at 0x0000.
fn machine_with(code: &[u8]) -> TestMachine {
    let mut machine = TestMachine::new();
    machine.write_block(0x0000, code).unwrap();
    machine
}

fn memptr(machine: &TestMachine) -> u16 {
    machine.value(Register::MemPtr)
}

/// Run the instruction at PC 0 once with the given MEMPTR preset.
fn run_once(machine: &mut TestMachine, preset: u16) -> u32 {
    machine.set_value(Register::PC, 0x0000);
    machine.set_value(Register::MemPtr, preset);
    machine.step()
}

// ---------------------------------------------------------------------------
// Exhaustive properties
// ---------------------------------------------------------------------------

#[test]
fn ld_a_from_absolute_address_sets_address_plus_one() {
    let mut machine = TestMachine::new();
    for addr in 0..=0xFFFFu16 {
        let [lo, hi] = addr.to_le_bytes();
        machine.write_block(0x0000, &[0x3A, lo, hi]).unwrap();
        run_once(&mut machine, addr ^ 0x5A5A);
        assert_eq!(memptr(&machine), addr.wrapping_add(1), "LD A,({addr:04X})");
    }
}

#[test]
fn ld_a_from_pair_sets_pair_plus_one() {
    for (opcode, pair) in [(0x0A, Register::BC), (0x1A, Register::DE)] {
        let mut machine = machine_with(&[opcode]);
        for value in 0..=0xFFFFu16 {
            machine.write_block(0x0000, &[opcode]).unwrap();
            machine.set_value(pair, value);
            run_once(&mut machine, !value);
            assert_eq!(memptr(&machine), value.wrapping_add(1), "{pair:?}={value:04X}");
        }
    }
}

#[test]
fn word_stores_set_address_plus_one() {
    let forms: [&[u8]; 7] = [
        &[0x22],       // LD (nn),HL
        &[0xED, 0x43], // LD (nn),BC
        &[0xED, 0x53], // LD (nn),DE
        &[0xED, 0x63], // LD (nn),HL
        &[0xED, 0x73], // LD (nn),SP
        &[0xDD, 0x22], // LD (nn),IX
        &[0xFD, 0x22], // LD (nn),IY
    ];
    let mut machine = TestMachine::new();
    for form in forms {
        for addr in 0..=0xFFFFu16 {
            let mut code = form.to_vec();
            code.extend_from_slice(&addr.to_le_bytes());
            machine.write_block(0x0000, &code).unwrap();
            run_once(&mut machine, 0x1234);
            assert_eq!(memptr(&machine), addr.wrapping_add(1), "{form:02X?} {addr:04X}");
        }
    }
}

#[test]
fn word_loads_set_address_plus_one() {
    let forms: [&[u8]; 4] = [&[0x2A], &[0xED, 0x4B], &[0xDD, 0x2A], &[0xFD, 0x2A]];
    let mut machine = TestMachine::new();
    for form in forms {
        for addr in [0x0000u16, 0x1234, 0x7FFF, 0xFFFF] {
            let mut code = form.to_vec();
            code.extend_from_slice(&addr.to_le_bytes());
            machine.write_block(0x0000, &code).unwrap();
            run_once(&mut machine, 0);
            assert_eq!(memptr(&machine), addr.wrapping_add(1));
        }
    }
}

#[test]
fn repeated_cpi_counts_up() {
    let mut machine = machine_with(&[0xED, 0xA1]);
    machine.set_value(Register::MemPtr, 0);
    for count in 1..=0x1_0000u32 {
        machine.set_value(Register::PC, 0x0000);
        machine.step();
        assert_eq!(u32::from(memptr(&machine)), count & 0xFFFF);
    }
}

#[test]
fn repeated_cpd_counts_down() {
    let mut machine = machine_with(&[0xED, 0xA9]);
    machine.set_value(Register::MemPtr, 0);
    for count in 1..=0x1_0000u32 {
        machine.set_value(Register::PC, 0x0000);
        machine.step();
        assert_eq!(u32::from(memptr(&machine)), (0x1_0000 - count) & 0xFFFF);
    }
}

#[test]
fn instructions_without_a_rule_leave_memptr_alone() {
    let unaffected: [&[u8]; 14] = [
        &[0x00],             // NOP
        &[0x41],             // LD B,C
        &[0x3C],             // INC A
        &[0x80],             // ADD A,B
        &[0x7E],             // LD A,(HL)
        &[0x77],             // LD (HL),A
        &[0xEB],             // EX DE,HL
        &[0xD9],             // EXX
        &[0xE9],             // JP (HL)
        &[0xC5],             // PUSH BC
        &[0xED, 0xA0],       // LDI
        &[0xED, 0xA8],       // LDD
        &[0xCB, 0x46],       // BIT 0,(HL)
        &[0xDD, 0x21, 1, 2], // LD IX,nn
    ];
    for code in unaffected {
        let mut machine = machine_with(code);
        machine.set_value(Register::HL, 0x8000);
        machine.set_value(Register::SP, 0xC000);
        for preset in (0..=0xFFFFu16).step_by(241) {
            run_once(&mut machine, preset);
            assert_eq!(memptr(&machine), preset, "{code:02X?} with {preset:04X}");
        }
    }
}

#[test]
fn jp_and_call_set_target_even_when_not_taken() {
    // Z set: JP NZ and CALL NZ fall through.
    for opcode in [0xC2, 0xC4] {
        let mut machine = machine_with(&[opcode, 0x34, 0x12]);
        machine.set_value(Register::F, u16::from(ZF));
        machine.set_value(Register::SP, 0xC000);
        let cycles = run_once(&mut machine, 0);
        assert_eq!(memptr(&machine), 0x1234);
        assert_eq!(machine.value(Register::PC), 0x0003);
        assert_eq!(cycles, 10);
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn ld_a_from_zero_wraps_preset() {
    let mut machine = machine_with(&[0x3A, 0x00, 0x00]);
    machine.set_value(Register::MemPtr, 0xFFFF);
    assert_eq!(machine.run(13), 13);
    assert_eq!(memptr(&machine), 0x0001);
}

#[test]
fn ld_a_from_bc_wraps_to_zero() {
    let mut machine = machine_with(&[0x0A]);
    machine.set_value(Register::BC, 0xFFFF);
    machine.set_value(Register::MemPtr, 0xFFFF);
    assert_eq!(machine.run(7), 7);
    assert_eq!(memptr(&machine), 0x0000);
}

#[test]
fn cpi_twice_from_same_pc() {
    let mut machine = machine_with(&[0xED, 0xA1]);
    machine.set_value(Register::MemPtr, 0);
    assert_eq!(machine.run(16), 16);
    assert_eq!(memptr(&machine), 1);
    machine.set_value(Register::PC, 0);
    assert_eq!(machine.run(16), 16);
    assert_eq!(memptr(&machine), 2);
}

// ---------------------------------------------------------------------------
// Accumulator stores: revision dependent
// ---------------------------------------------------------------------------

fn store_memptr(revision: Revision, code: &[u8], setup: impl Fn(&mut TestMachine)) -> u16 {
    let mut machine = TestMachine::with_config(Z80Config::for_revision(revision));
    machine.write_block(0x0000, code).unwrap();
    setup(&mut machine);
    machine.step();
    memptr(&machine)
}

#[test]
fn ld_absolute_a_mixes_accumulator_into_high_byte() {
    let set_a = |m: &mut TestMachine| m.set_value(Register::A, 0xAB);
    assert_eq!(store_memptr(Revision::Nmos, &[0x32, 0x34, 0x12], set_a), 0xAB35);
    assert_eq!(store_memptr(Revision::Bm1, &[0x32, 0x34, 0x12], set_a), 0x0035);
    // Low byte wraps without carrying into the high byte.
    assert_eq!(store_memptr(Revision::Nmos, &[0x32, 0xFF, 0x12], set_a), 0xAB00);
}

#[test]
fn ld_pair_a_mixes_accumulator_into_high_byte() {
    let setup = |m: &mut TestMachine| {
        m.set_value(Register::A, 0x77);
        m.set_value(Register::BC, 0x12FF);
        m.set_value(Register::DE, 0x3410);
    };
    assert_eq!(store_memptr(Revision::Nmos, &[0x02], setup), 0x7700);
    assert_eq!(store_memptr(Revision::Nmos, &[0x12], setup), 0x7711);
    assert_eq!(store_memptr(Revision::Bm1, &[0x02], setup), 0x0000);
    assert_eq!(store_memptr(Revision::Bm1, &[0x12], setup), 0x0011);
}

#[test]
fn out_immediate_mixes_accumulator_into_high_byte() {
    let set_a = |m: &mut TestMachine| m.set_value(Register::A, 0x12);
    assert_eq!(store_memptr(Revision::Nmos, &[0xD3, 0xFE], set_a), 0x12FF);
    assert_eq!(store_memptr(Revision::Nmos, &[0xD3, 0xFF], set_a), 0x1200);
    assert_eq!(store_memptr(Revision::Bm1, &[0xD3, 0xFE], set_a), 0x00FF);
}

#[test]
fn default_revision_is_nmos() {
    let mut machine = machine_with(&[0x32, 0x00, 0x40]);
    machine.set_value(Register::A, 0x99);
    machine.step();
    assert_eq!(memptr(&machine), 0x9901);
}

// ---------------------------------------------------------------------------
// Pair based rules
// ---------------------------------------------------------------------------

#[test]
fn ex_sp_takes_new_pair_value() {
    for (code, pair) in [
        (&[0xE3][..], Register::HL),
        (&[0xDD, 0xE3][..], Register::IX),
        (&[0xFD, 0xE3][..], Register::IY),
    ] {
        let mut machine = machine_with(code);
        machine.write_block(0x8000, &[0x34, 0x12]).unwrap();
        machine.set_value(Register::SP, 0x8000);
        machine.set_value(pair, 0x5678);
        machine.step();
        assert_eq!(machine.value(pair), 0x1234);
        assert_eq!(memptr(&machine), 0x1234);
        assert_eq!(machine.read(0x8000), 0x78);
    }
}

#[test]
fn sixteen_bit_arithmetic_uses_left_operand_plus_one() {
    let cases: [(&[u8], Register, u16); 6] = [
        (&[0x09], Register::HL, 0x1000),       // ADD HL,BC
        (&[0x29], Register::HL, 0xFFFF),       // ADD HL,HL
        (&[0xDD, 0x19], Register::IX, 0x2000), // ADD IX,DE
        (&[0xFD, 0x39], Register::IY, 0x3000), // ADD IY,SP
        (&[0xED, 0x4A], Register::HL, 0x4000), // ADC HL,BC
        (&[0xED, 0x52], Register::HL, 0x5000), // SBC HL,DE
    ];
    for (code, left, value) in cases {
        let mut machine = machine_with(code);
        machine.set_value(left, value);
        machine.set_value(Register::BC, 0x0101);
        machine.set_value(Register::DE, 0x0202);
        machine.step();
        assert_eq!(memptr(&machine), value.wrapping_add(1), "{code:02X?}");
    }
}

#[test]
fn rld_and_rrd_use_hl_plus_one() {
    for opcode in [0x67, 0x6F] {
        let mut machine = machine_with(&[0xED, opcode]);
        machine.set_value(Register::HL, 0x4000);
        assert_eq!(machine.step(), 18);
        assert_eq!(memptr(&machine), 0x4001);
    }
}

// ---------------------------------------------------------------------------
// Control flow
// ---------------------------------------------------------------------------

#[test]
fn jr_sets_target() {
    let mut machine = machine_with(&[0x18, 0x05]);
    assert_eq!(machine.step(), 12);
    assert_eq!(machine.value(Register::PC), 0x0007);
    assert_eq!(memptr(&machine), 0x0007);
}

#[test]
fn jr_cc_sets_target_only_when_taken() {
    let mut machine = machine_with(&[0x20, 0xFE]); // JR NZ,$
    machine.set_value(Register::F, u16::from(ZF));
    assert_eq!(run_once(&mut machine, 0xBEEF), 7);
    assert_eq!(memptr(&machine), 0xBEEF);

    machine.set_value(Register::F, 0);
    assert_eq!(run_once(&mut machine, 0xBEEF), 12);
    assert_eq!(memptr(&machine), 0x0000);
}

#[test]
fn djnz_sets_target_only_when_taken() {
    let mut machine = TestMachine::new();
    machine.write_block(0x0100, &[0x10, 0xFE]).unwrap();
    machine.set_value(Register::PC, 0x0100);
    machine.set_value(Register::B, 2);
    machine.set_value(Register::MemPtr, 0xBEEF);
    assert_eq!(machine.step(), 13);
    assert_eq!(memptr(&machine), 0x0100);

    machine.set_value(Register::MemPtr, 0xBEEF);
    assert_eq!(machine.step(), 8);
    assert_eq!(machine.value(Register::PC), 0x0102);
    assert_eq!(memptr(&machine), 0xBEEF);
}

#[test]
fn returns_set_target() {
    for (code, cycles) in [(&[0xC9][..], 10), (&[0xED, 0x45][..], 14), (&[0xED, 0x4D][..], 14)] {
        let mut machine = machine_with(code);
        machine.write_block(0x8000, &[0x34, 0x12]).unwrap();
        machine.set_value(Register::SP, 0x8000);
        assert_eq!(machine.step(), cycles);
        assert_eq!(machine.value(Register::PC), 0x1234);
        assert_eq!(memptr(&machine), 0x1234);
    }
}

#[test]
fn ret_cc_sets_target_only_when_taken() {
    let mut machine = machine_with(&[0xC8]); // RET Z
    machine.write_block(0x8000, &[0x34, 0x12]).unwrap();
    machine.set_value(Register::SP, 0x8000);
    machine.set_value(Register::F, 0);
    assert_eq!(run_once(&mut machine, 0xBEEF), 5);
    assert_eq!(memptr(&machine), 0xBEEF);
    assert_eq!(machine.value(Register::SP), 0x8000);

    machine.set_value(Register::F, u16::from(ZF));
    assert_eq!(run_once(&mut machine, 0xBEEF), 11);
    assert_eq!(memptr(&machine), 0x1234);
}

#[test]
fn taken_jumps_and_calls_set_target() {
    let cases: [(&[u8], u32); 4] = [
        (&[0xC3, 0x34, 0x12], 10), // JP nn
        (&[0xCA, 0x34, 0x12], 10), // JP Z,nn
        (&[0xCD, 0x34, 0x12], 17), // CALL nn
        (&[0xCC, 0x34, 0x12], 17), // CALL Z,nn
    ];
    for (code, cycles) in cases {
        let mut machine = machine_with(code);
        machine.set_value(Register::F, u16::from(ZF));
        machine.set_value(Register::SP, 0xC000);
        assert_eq!(machine.step(), cycles);
        assert_eq!(machine.value(Register::PC), 0x1234);
        assert_eq!(memptr(&machine), 0x1234);
    }
}

#[test]
fn rst_sets_vector() {
    for p in (0x00..=0x38u8).step_by(8) {
        let mut machine = machine_with(&[0xC7 | p]);
        machine.set_value(Register::SP, 0xC000);
        assert_eq!(machine.step(), 11);
        assert_eq!(memptr(&machine), u16::from(p));
        assert_eq!(machine.read(0xBFFE), 0x01);
    }
}

// ---------------------------------------------------------------------------
// I/O
// ---------------------------------------------------------------------------

#[test]
fn in_a_immediate_uses_accumulator_and_port() {
    let mut machine = machine_with(&[0xDB, 0x34]);
    machine.set_value(Register::A, 0x12);
    machine.set_port_input(0x1234, 0x99);
    assert_eq!(machine.step(), 11);
    assert_eq!(machine.value(Register::A), 0x99);
    assert_eq!(memptr(&machine), 0x1235);

    let mut machine = machine_with(&[0xDB, 0xFF]);
    machine.set_value(Register::A, 0xFF);
    machine.step();
    assert_eq!(memptr(&machine), 0x0000);
}

#[test]
fn register_io_through_c_uses_bc_plus_one() {
    // IN B..A,(C), IN (C), OUT (C),B..A, OUT (C),0
    for opcode in (0x40..=0x78u8).step_by(8).chain((0x41..=0x79u8).step_by(8)) {
        let mut machine = machine_with(&[0xED, opcode]);
        machine.set_value(Register::BC, 0x10FE);
        assert_eq!(machine.step(), 12);
        let bc = 0x10FEu16;
        assert_eq!(memptr(&machine), bc.wrapping_add(1), "ED {opcode:02X}");
    }
}

#[test]
fn io_block_transfers_use_bc_around_decrement() {
    // INI/IND use BC before B is decremented; OUTI/OUTD use it after.
    let cases = [(0xA2u8, 0x10FF), (0xAA, 0x10FD), (0xA3, 0x0FFF), (0xAB, 0x0FFD)];
    for (opcode, expected) in cases {
        let mut machine = machine_with(&[0xED, opcode]);
        machine.set_value(Register::BC, 0x10FE);
        machine.set_value(Register::HL, 0x8000);
        assert_eq!(machine.step(), 16);
        assert_eq!(memptr(&machine), expected, "ED {opcode:02X}");
        assert_eq!(machine.value(Register::B), 0x0F);
    }
}

#[test]
fn inir_applies_rule_every_iteration() {
    let mut machine = machine_with(&[0xED, 0xB2]);
    machine.set_value(Register::BC, 0x02FE);
    machine.set_value(Register::HL, 0x8000);
    machine.set_port_input(0x02FE, 0x11);
    machine.set_port_input(0x01FE, 0x22);
    assert_eq!(machine.step(), 21);
    assert_eq!(memptr(&machine), 0x02FF);
    assert_eq!(machine.value(Register::PC), 0x0000);
    assert_eq!(machine.step(), 16);
    assert_eq!(memptr(&machine), 0x01FF);
    assert_eq!(machine.value(Register::PC), 0x0002);
    assert_eq!((machine.read(0x8000), machine.read(0x8001)), (0x11, 0x22));
}

#[test]
fn otdr_applies_rule_every_iteration() {
    let mut machine = machine_with(&[0xED, 0xBB]);
    machine.write_block(0x8000, &[0xAA, 0xBB]).unwrap();
    machine.set_value(Register::BC, 0x0210);
    machine.set_value(Register::HL, 0x8001);
    assert_eq!(machine.step(), 21);
    assert_eq!(memptr(&machine), 0x010F);
    assert_eq!(machine.step(), 16);
    assert_eq!(memptr(&machine), 0x000F);
    assert_eq!(machine.port_writes(), &[(0x0110, 0xBB), (0x0010, 0xAA)]);
}

// ---------------------------------------------------------------------------
// Block compare and transfer
// ---------------------------------------------------------------------------

#[test]
fn cpir_uses_pc_while_repeating_then_increments() {
    let mut machine = TestMachine::new();
    machine.write_block(0x0100, &[0xED, 0xB1]).unwrap();
    machine.set_value(Register::PC, 0x0100);
    machine.set_value(Register::HL, 0x8000);
    machine.set_value(Register::BC, 3);
    machine.set_value(Register::A, 0x55);
    machine.set_value(Register::MemPtr, 0);

    assert_eq!(machine.step(), 21);
    assert_eq!(memptr(&machine), 0x0101);
    assert_eq!(machine.step(), 21);
    assert_eq!(memptr(&machine), 0x0101);
    assert_eq!(machine.step(), 16);
    assert_eq!(memptr(&machine), 0x0102);
    assert_eq!(machine.value(Register::PC), 0x0102);
    assert_eq!(machine.value(Register::BC), 0);
}

#[test]
fn cpdr_stops_on_match() {
    let mut machine = TestMachine::new();
    machine.write_block(0x0100, &[0xED, 0xB9]).unwrap();
    machine.write_block(0x7FFF, &[0x55]).unwrap();
    machine.set_value(Register::PC, 0x0100);
    machine.set_value(Register::HL, 0x8000);
    machine.set_value(Register::BC, 10);
    machine.set_value(Register::A, 0x55);

    assert_eq!(machine.step(), 21);
    assert_eq!(memptr(&machine), 0x0101);
    // Match found: final iteration behaves as CPD.
    assert_eq!(machine.step(), 16);
    assert_eq!(memptr(&machine), 0x0100);
    assert_eq!(machine.value(Register::BC), 8);
    assert_ne!(machine.value(Register::F) & u16::from(ZF), 0);
}

#[test]
fn ldir_uses_pc_while_repeating_then_keeps_value() {
    let mut machine = TestMachine::new();
    machine.write_block(0x0100, &[0xED, 0xB0]).unwrap();
    machine.write_block(0x8000, &[1, 2]).unwrap();
    machine.set_value(Register::PC, 0x0100);
    machine.set_value(Register::HL, 0x8000);
    machine.set_value(Register::DE, 0x9000);
    machine.set_value(Register::BC, 2);
    machine.set_value(Register::MemPtr, 0x1234);

    assert_eq!(machine.step(), 21);
    assert_eq!(memptr(&machine), 0x0101);
    assert_eq!(machine.step(), 16);
    assert_eq!(memptr(&machine), 0x0101);
    assert_eq!((machine.read(0x9000), machine.read(0x9001)), (1, 2));

    // Single pass: nothing repeats, MEMPTR untouched.
    machine.set_value(Register::PC, 0x0100);
    machine.set_value(Register::BC, 1);
    machine.set_value(Register::MemPtr, 0x1234);
    assert_eq!(machine.step(), 16);
    assert_eq!(memptr(&machine), 0x1234);
}

// ---------------------------------------------------------------------------
// Indexed addressing
// ---------------------------------------------------------------------------

#[test]
fn indexed_accesses_set_effective_address() {
    let cases: [(&[u8], Register, u16); 5] = [
        (&[0xDD, 0x7E, 0x05], Register::IX, 0x1005),       // LD A,(IX+5)
        (&[0xFD, 0x77, 0xFE], Register::IY, 0x0FFE),       // LD (IY-2),A
        (&[0xDD, 0x34, 0x10], Register::IX, 0x1010),       // INC (IX+16)
        (&[0xFD, 0x36, 0x80, 0x42], Register::IY, 0x0F80), // LD (IY-128),n
        (&[0xDD, 0xBE, 0x7F], Register::IX, 0x107F),       // CP (IX+127)
    ];
    for (code, index, expected) in cases {
        let mut machine = machine_with(code);
        machine.set_value(index, 0x1000);
        machine.step();
        assert_eq!(memptr(&machine), expected, "{code:02X?}");
    }
}

#[test]
fn indexed_bit_operations_set_effective_address() {
    for opcode in [0x06, 0x46, 0x86, 0xC6, 0x00] {
        let mut machine = machine_with(&[0xFD, 0xCB, 0xFF, opcode]);
        machine.set_value(Register::IY, 0x2800);
        machine.step();
        assert_eq!(memptr(&machine), 0x27FF, "FD CB FF {opcode:02X}");
    }
}

#[test]
fn index_prefix_on_plain_load_keeps_its_rule() {
    let mut machine = machine_with(&[0xDD, 0x3A, 0x00, 0x50]);
    assert_eq!(machine.step(), 17);
    assert_eq!(memptr(&machine), 0x5001);
}

// ---------------------------------------------------------------------------
// Observable effects
// ---------------------------------------------------------------------------

#[test]
fn bit_hl_leaks_memptr_high_byte_into_xy() {
    let mut machine = machine_with(&[0xCB, 0x46]);
    machine.set_value(Register::HL, 0x8000);
    run_once(&mut machine, 0x2800);
    assert_eq!(machine.value(Register::F) & 0x28, 0x28);
    assert_eq!(memptr(&machine), 0x2800);

    run_once(&mut machine, 0xD700);
    assert_eq!(machine.value(Register::F) & 0x28, 0x00);
}

#[test]
fn indexed_bit_leaks_address_high_byte_into_xy() {
    let mut machine = machine_with(&[0xDD, 0xCB, 0x00, 0x46]);
    machine.set_value(Register::IX, 0x2800);
    assert_eq!(machine.step(), 20);
    assert_eq!(machine.value(Register::F) & 0x28, 0x28);
}

// ---------------------------------------------------------------------------
// Interrupts
// ---------------------------------------------------------------------------

#[test]
fn interrupt_acceptance_sets_service_address() {
    let mut machine = TestMachine::new();
    machine.set_value(Register::SP, 0xC000);
    machine.set_value(Register::IFF1, 1);
    machine.set_value(Register::IM, 1);
    machine.interrupt(0xFF);
    assert_eq!(machine.step(), 13);
    assert_eq!(memptr(&machine), 0x0038);

    let mut machine = TestMachine::new();
    machine.set_value(Register::SP, 0xC000);
    machine.nmi();
    assert_eq!(machine.step(), 11);
    assert_eq!(memptr(&machine), 0x0066);

    let mut machine = TestMachine::new();
    machine.write_block(0x40FE, &[0x00, 0x90]).unwrap();
    machine.set_value(Register::SP, 0xC000);
    machine.set_value(Register::I, 0x40);
    machine.set_value(Register::IFF1, 1);
    machine.set_value(Register::IM, 2);
    machine.interrupt(0xFE);
    assert_eq!(machine.step(), 19);
    assert_eq!(memptr(&machine), 0x9000);
}
