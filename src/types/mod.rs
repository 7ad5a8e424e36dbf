//! Core types for context word extraction.

mod config;
mod slot;
mod token;

pub use config::{
    CorpusFormat, Encoding, ExtractionConfig, SentenceBoundary, DEFAULT_LINE_MACHINE, ENV_PREFIX,
};
pub use slot::{PathData, Side, SlotPosition, WindowSlot};
pub use token::{OccurrenceId, TokenLine};
