//! Context Words Library
//!
//! Extracts the context words around token occurrences in a dependency
//! parsed corpus. Every occurrence yields a window of lines with relative
//! positions, sentence membership and, optionally, the dependency path
//! linking each context word to the target.

pub mod batch;
pub mod dependency;
pub mod error;
pub mod matcher;
pub mod output;
pub mod processing;
pub mod types;
pub mod window;

pub use batch::{BatchConfig, BatchError, BatchExtractor, BatchReport};
pub use dependency::{DependencyPath, FrontierStep, PathFinder, SentenceGraph};
pub use error::{ConfigError, ExtractError, Result};
pub use matcher::{LineMatcher, RegexLineMatcher};
pub use output::{OutputFormat, SlotWriter};
pub use types::{CorpusFormat, ExtractionConfig, OccurrenceId, PathData, WindowSlot};
pub use window::{find_occurrences, WindowExtractor};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::batch::*;
    pub use crate::dependency::{DependencyPath, FrontierStep, PathFinder, SentenceGraph};
    pub use crate::error::{ConfigError, ExtractError};
    pub use crate::matcher::{LineMatcher, RegexLineMatcher};
    pub use crate::processing::{CorpusFile, FileFilter, FileProcessor};
    pub use crate::types::*;
    pub use crate::window::{find_occurrences, WindowExtractor};
}

/// Default number of lines to the left of the target
pub const DEFAULT_LEFT_SPAN: usize = 10;

/// Default number of lines to the right of the target
pub const DEFAULT_RIGHT_SPAN: usize = 10;

/// Default number of corpus files processed concurrently
pub const DEFAULT_CONCURRENCY: usize = 4;
