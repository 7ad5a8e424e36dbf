//! Window extraction around token occurrences.
//!
//! For every occurrence the extractor walks a fixed window of lines,
//! classifies each line as text or non-text, decides whether it belongs to
//! the sentence of the target, and (in dependency mode) attaches the
//! dependency path linking it to the target.

mod boundary;
mod extractor;

pub use boundary::SentenceBoundaries;
pub use extractor::{find_occurrences, WindowExtractor};
