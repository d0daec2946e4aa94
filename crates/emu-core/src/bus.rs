//! Memory and I/O bus interface.

/// Memory bus interface.
///
/// CPUs reach memory through this trait. Addresses are 16-bit, so every
/// access lands somewhere in the 64 KiB space; there is no fault path.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Read a byte without side effects.
    ///
    /// Used by instruction decoders, which must classify the next
    /// instruction without disturbing machine state.
    fn peek(&self, address: u16) -> u8;
}

/// A bus that also has a separate I/O port space.
///
/// The Z80 addresses ports with the full 16-bit address bus: `IN A,(n)`
/// puts A on the upper half, `IN r,(C)` puts B there.
pub trait IoBus: Bus {
    /// Read a byte from the given I/O port.
    fn read_io(&mut self, port: u16) -> u8;

    /// Write a byte to the given I/O port.
    fn write_io(&mut self, port: u16, value: u8);
}
