//! Flat 64 KiB address space.
//!
//! No banking, no ROM, no contention: every address is plain RAM and
//! addresses wrap at 0xFFFF.

use emu_core::Bus;

use crate::error::{ConfigError, Result};

/// Size of the Z80 address space in bytes.
pub const ADDRESS_SPACE_SIZE: usize = 0x1_0000;

/// Byte-addressable 64 KiB store.
#[derive(Clone, PartialEq, Eq)]
pub struct AddressSpace {
    // Always exactly ADDRESS_SPACE_SIZE bytes, so any u16 indexes it.
    bytes: Box<[u8]>,
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AddressSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressSpace")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

impl AddressSpace {
    /// Zero-filled address space.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: vec![0; ADDRESS_SPACE_SIZE].into_boxed_slice(),
        }
    }

    /// Take ownership of a caller-supplied 64 KiB image.
    ///
    /// # Errors
    ///
    /// `AddressSpaceTooSmall` if the image is short, `ImageTooLarge` if it
    /// is longer than the address space.
    pub fn from_image(image: Vec<u8>) -> Result<Self> {
        match image.len() {
            ADDRESS_SPACE_SIZE => Ok(Self {
                bytes: image.into_boxed_slice(),
            }),
            n if n < ADDRESS_SPACE_SIZE => Err(ConfigError::AddressSpaceTooSmall(n)),
            n => Err(ConfigError::ImageTooLarge(n)),
        }
    }

    #[must_use]
    pub fn read(&self, address: u16) -> u8 {
        self.bytes[usize::from(address)]
    }

    pub fn write(&mut self, address: u16, value: u8) {
        self.bytes[usize::from(address)] = value;
    }

    /// Little-endian word at `address`, high byte from `address + 1` (wrapping).
    #[must_use]
    pub fn read_word(&self, address: u16) -> u16 {
        u16::from_le_bytes([self.read(address), self.read(address.wrapping_add(1))])
    }

    /// Install a block of bytes starting at `start`, wrapping past 0xFFFF.
    ///
    /// # Errors
    ///
    /// `ImageTooLarge` if the block is longer than the whole address space.
    pub fn write_block(&mut self, start: u16, data: &[u8]) -> Result<()> {
        if data.len() > ADDRESS_SPACE_SIZE {
            return Err(ConfigError::ImageTooLarge(data.len()));
        }
        let start = usize::from(start);
        let first = data.len().min(ADDRESS_SPACE_SIZE - start);
        let (head, tail) = data.split_at(first);
        self.bytes[start..start + first].copy_from_slice(head);
        self.bytes[..tail.len()].copy_from_slice(tail);
        Ok(())
    }

    /// The whole address space, for snapshots and inspection.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Bus for AddressSpace {
    fn read(&mut self, address: u16) -> u8 {
        AddressSpace::read(self, address)
    }

    fn write(&mut self, address: u16, value: u8) {
        AddressSpace::write(self, address, value);
    }

    fn peek(&self, address: u16) -> u8 {
        AddressSpace::read(self, address)
    }
}
