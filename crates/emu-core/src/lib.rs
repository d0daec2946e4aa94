//! Core traits and types shared by cycle-counted CPU cores.
//!
//! A CPU core executes against a bus it does not own. Time is counted in
//! T-states; every instruction reports how many it consumed.

mod bus;
mod cpu;
mod observable;
mod ticks;

pub use bus::{Bus, IoBus};
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
