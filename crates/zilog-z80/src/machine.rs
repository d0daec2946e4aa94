//! Test machine: a Z80, a flat address space and stub I/O ports.
//!
//! This is the surface drivers and tests use. Ports read back whatever was
//! set with [`TestMachine::set_port_input`] (0xFF when nothing was set) and
//! every port write is recorded.

use std::collections::HashMap;

use emu_core::{Bus, IoBus, Ticks};

use crate::config::Z80Config;
use crate::cpu::Z80;
use crate::error::Result;
use crate::memory::AddressSpace;
use crate::registers::{Register, Registers};

/// Memory plus port stubs, as seen by the CPU.
#[derive(Debug, Clone, Default)]
pub struct MachineBus {
    pub memory: AddressSpace,
    port_inputs: HashMap<u16, u8>,
    port_writes: Vec<(u16, u8)>,
}

impl MachineBus {
    #[must_use]
    pub fn new(memory: AddressSpace) -> Self {
        Self {
            memory,
            port_inputs: HashMap::new(),
            port_writes: Vec::new(),
        }
    }
}

impl Bus for MachineBus {
    fn read(&mut self, address: u16) -> u8 {
        self.memory.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory.write(address, value);
    }

    fn peek(&self, address: u16) -> u8 {
        self.memory.read(address)
    }
}

impl IoBus for MachineBus {
    fn read_io(&mut self, port: u16) -> u8 {
        self.port_inputs.get(&port).copied().unwrap_or(0xFF)
    }

    fn write_io(&mut self, port: u16, value: u8) {
        self.port_writes.push((port, value));
    }
}

/// A Z80 wired to 64 KiB of RAM and a port map.
pub struct TestMachine {
    cpu: Z80,
    bus: MachineBus,
}

impl Default for TestMachine {
    fn default() -> Self {
        Self::with_config(Z80Config::default())
    }
}

impl TestMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroed memory, CPU in its power-on state.
    #[must_use]
    pub fn with_config(config: Z80Config) -> Self {
        Self {
            cpu: Z80::new(config),
            bus: MachineBus::default(),
        }
    }

    /// Start from a complete 64 KiB memory image.
    pub fn with_image(image: Vec<u8>, config: Z80Config) -> Result<Self> {
        let memory = AddressSpace::from_image(image)?;
        Ok(Self {
            cpu: Z80::new(config),
            bus: MachineBus::new(memory),
        })
    }

    #[must_use]
    pub fn value(&self, register: Register) -> u16 {
        self.cpu.value(register)
    }

    pub fn set_value(&mut self, register: Register, value: u16) {
        self.cpu.set_value(register, value);
    }

    /// Copy `bytes` into memory at `address`. Registers are not touched.
    pub fn write_block(&mut self, address: u16, bytes: &[u8]) -> Result<()> {
        self.bus.memory.write_block(address, bytes)
    }

    #[must_use]
    pub fn read(&self, address: u16) -> u8 {
        self.bus.memory.read(address)
    }

    /// Run whole instructions until at least `cycles` T-states have
    /// elapsed. Returns the T-states actually run, which may overshoot by
    /// part of the last instruction.
    pub fn run(&mut self, cycles: u64) -> u64 {
        let mut elapsed = 0;
        while elapsed < cycles {
            elapsed += u64::from(self.cpu.step(&mut self.bus));
        }
        elapsed
    }

    /// One instruction or interrupt acknowledge.
    pub fn step(&mut self) -> u32 {
        self.cpu.step(&mut self.bus)
    }

    /// Byte returned by `IN` from `port` (full 16-bit port address).
    pub fn set_port_input(&mut self, port: u16, value: u8) {
        self.bus.port_inputs.insert(port, value);
    }

    /// Every `(port, value)` written so far, oldest first.
    #[must_use]
    pub fn port_writes(&self) -> &[(u16, u8)] {
        &self.bus.port_writes
    }

    /// Drain the port write log, leaving it empty.
    pub fn take_port_writes(&mut self) -> Vec<(u16, u8)> {
        std::mem::take(&mut self.bus.port_writes)
    }

    pub fn interrupt(&mut self, data: u8) {
        self.cpu.interrupt(data);
    }

    /// Raise INT with the configured data bus byte.
    pub fn request_interrupt(&mut self) {
        self.cpu.request_interrupt();
    }

    pub fn clear_interrupt(&mut self) {
        self.cpu.clear_interrupt();
    }

    pub fn nmi(&mut self) {
        self.cpu.nmi();
    }

    #[must_use]
    pub fn registers(&self) -> Registers {
        *self.cpu.regs()
    }

    #[must_use]
    pub fn total_ticks(&self) -> Ticks {
        self.cpu.total_ticks()
    }

    #[must_use]
    pub fn cpu(&self) -> &Z80 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Z80 {
        &mut self.cpu
    }

    #[must_use]
    pub fn memory(&self) -> &AddressSpace {
        &self.bus.memory
    }
}
