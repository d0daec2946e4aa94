//! Setup-time errors.
//!
//! Execution itself cannot fail: every byte pattern is some instruction.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("address space image is {0} bytes; the Z80 needs 65536")]
    AddressSpaceTooSmall(usize),
    #[error("image of {0} bytes does not fit in the 65536-byte address space")]
    ImageTooLarge(usize),
}
