//! Token lines and occurrence identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// One matched corpus line.
///
/// The structured attributes are parsed from the configured columns; all
/// columns are also kept verbatim in `fields`, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLine {
    /// Position of the token in its sentence, if the id column parses.
    pub position: Option<usize>,
    /// Lemma.
    pub lemma: Option<String>,
    /// Part-of-speech tag.
    pub pos: Option<String>,
    /// Position of the syntactic head (`None` for roots or unparsable heads).
    pub head: Option<usize>,
    /// Dependency relation to the head.
    pub relation: Option<String>,
    /// All captured columns as `(name, value)` pairs.
    pub fields: Vec<(String, String)>,
}

impl TokenLine {
    /// Get a captured column by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Identifier of a token occurrence: `<type>/<file-stem>/<line>`.
///
/// The line number is 1-based. The type may itself contain slashes
/// (`eat/verb/corpus01/12`), so the identifier is parsed from the right.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OccurrenceId {
    /// Token type, e.g. `eat/verb`.
    pub type_name: String,
    /// Stem of the corpus file name.
    pub file_stem: String,
    /// 1-based line number.
    pub line: usize,
}

impl OccurrenceId {
    /// Create an identifier for the given 1-based line.
    pub fn new(type_name: impl Into<String>, file_stem: impl Into<String>, line: usize) -> Self {
        Self {
            type_name: type_name.into(),
            file_stem: file_stem.into(),
            line,
        }
    }

    /// Zero-based line index in the file, `None` for line 0.
    pub fn index(&self) -> Option<usize> {
        self.line.checked_sub(1)
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.type_name, self.file_stem, self.line)
    }
}

impl FromStr for OccurrenceId {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ExtractError::InvalidOccurrence {
            id: s.to_string(),
            reason,
        };

        let mut parts = s.rsplitn(3, '/');
        let line = parts.next().ok_or_else(|| invalid("missing line number"))?;
        let file_stem = parts.next().ok_or_else(|| invalid("missing file stem"))?;
        let type_name = parts.next().ok_or_else(|| invalid("missing type"))?;

        let line: usize = line
            .parse()
            .map_err(|_| invalid("line number is not an integer"))?;
        if line == 0 {
            return Err(invalid("line numbers are 1-based"));
        }
        if file_stem.is_empty() {
            return Err(invalid("empty file stem"));
        }
        if type_name.is_empty() {
            return Err(invalid("empty type"));
        }

        Ok(Self::new(type_name, file_stem, line))
    }
}

impl TryFrom<String> for OccurrenceId {
    type Error = ExtractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OccurrenceId> for String {
    fn from(id: OccurrenceId) -> Self {
        id.to_string()
    }
}
