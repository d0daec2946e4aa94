//! Zilog Z80 CPU core with exact T-state counts and MEMPTR (WZ) emulation.
//!
//! Each call to [`Z80::step`] runs one whole instruction (or accepts one
//! interrupt) and returns the T-states it took. [`TestMachine`] wraps a CPU,
//! 64 KiB of RAM and stub I/O ports for drivers and tests.

mod alu;
mod config;
mod cpu;
mod decode;
mod error;
mod flags;
mod interrupt;
mod machine;
mod memory;
mod memptr;
mod registers;

pub use config::{Revision, Z80Config};
pub use cpu::Z80;
pub use decode::{IndexRegister, Instruction, Prefix, decode};
pub use error::{ConfigError, Result};
pub use flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
pub use interrupt::{InterruptController, InterruptKind};
pub use machine::{MachineBus, TestMachine};
pub use memory::{ADDRESS_SPACE_SIZE, AddressSpace};
pub use memptr::{Direction, MemptrInputs, MemptrRule, MemptrTable};
pub use registers::{Register, Registers};
