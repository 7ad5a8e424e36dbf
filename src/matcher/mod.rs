//! Corpus line matching.
//!
//! A [`LineMatcher`] turns one raw corpus line into a [`TokenLine`] or
//! reports that the line is not a token line (a sentence delimiter, a
//! header, markup). Rejected lines are a normal outcome, not an error.

mod regex_matcher;

pub use regex_matcher::RegexLineMatcher;

use crate::types::TokenLine;

/// The trait every corpus line matcher implements.
pub trait LineMatcher: Send + Sync {
    /// Get the name of this matcher.
    fn name(&self) -> &'static str;

    /// Parse a line, returning `None` for non-text lines.
    fn match_line(&self, line: &str) -> Option<TokenLine>;

    /// Render the type string (e.g. `lemma/pos`) of a matched token.
    fn token_type(&self, token: &TokenLine) -> String;

    /// Names of the columns every matched token carries.
    fn columns(&self) -> &[String];

    /// Sentence position of a line, or `None` when it is not a token line.
    fn position(&self, line: &str) -> Option<usize> {
        self.match_line(line).and_then(|token| token.position)
    }
}
