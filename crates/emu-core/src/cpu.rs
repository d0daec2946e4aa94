//! CPU core trait.

use crate::Bus;

/// A CPU core that executes whole instructions.
///
/// The bus is passed in, not owned, so one bus can be shared between a CPU
/// and whatever else sits on it.
pub trait Cpu<B: Bus> {
    /// The type used for register inspection.
    type Registers;

    /// Execute one instruction (or accept one pending interrupt).
    ///
    /// Returns the T-states consumed.
    fn step(&mut self, bus: &mut B) -> u32;

    /// Reset the CPU to its power-on state.
    fn reset(&mut self);

    /// Raise the maskable interrupt line, supplying the byte the
    /// interrupting device places on the data bus during acknowledge.
    fn interrupt(&mut self, data: u8);

    /// Request a non-maskable interrupt.
    fn nmi(&mut self);

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;
}
