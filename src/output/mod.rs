//! Output module for writing extracted window slots.

mod writer;

pub use writer::{OutputFormat, SlotWriter, FIXED_COLUMNS};
