//! Core configuration, fixed at construction time.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Chip revision, as far as MEMPTR is concerned.
///
/// The two known behaviours differ only in what ends up in the high byte of
/// MEMPTR after `LD (nn),A`, `LD (BC),A`, `LD (DE),A` and `OUT (n),A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Revision {
    /// Zilog NMOS and most clones: the high byte takes the value of A.
    #[default]
    Nmos,
    /// BM1 clone: the high byte is cleared.
    Bm1,
}

/// Configuration for creating a [`Z80`](crate::Z80).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Z80Config {
    pub revision: Revision,
    /// Value read from the data bus during a maskable interrupt acknowledge
    /// when the request does not carry its own. A floating bus reads 0xFF.
    pub interrupt_data_bus: u8,
}

impl Default for Z80Config {
    fn default() -> Self {
        Self {
            revision: Revision::Nmos,
            interrupt_data_bus: 0xFF,
        }
    }
}

impl Z80Config {
    /// Default configuration for the given revision.
    #[must_use]
    pub fn for_revision(revision: Revision) -> Self {
        Self {
            revision,
            ..Self::default()
        }
    }
}
