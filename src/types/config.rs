//! Configuration types for context word extraction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{DEFAULT_CONCURRENCY, DEFAULT_LEFT_SPAN, DEFAULT_RIGHT_SPAN};

/// Prefix of the environment variables read by [`ExtractionConfig::load`].
pub const ENV_PREFIX: &str = "CONTEXTWORDS";

/// Default line pattern: `word \t pos \t lemma \t id \t head \t deprel`.
///
/// Only the first character of the part-of-speech tag is captured, so
/// `NNS` and `NN` share the type `lemma/N`.
pub const DEFAULT_LINE_MACHINE: &str =
    r"^([^\t]+)\t([^\t])[^\t]*\t([^\t]+)\t([^\t]+)\t([^\t]+)\t([^\t]+)$";

/// How sentence boundaries are recognised inside an extraction window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceBoundary {
    /// Every line the matcher rejects is a boundary.
    NonText,
    /// Only rejected lines that also match `boundary_pattern` are boundaries.
    Pattern,
    /// No boundaries: every token line counts as same-sentence.
    Disabled,
}

/// Text encoding of corpus files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Strict UTF-8; invalid files fail with a decode error.
    Utf8,
    /// ISO-8859-1; every byte sequence decodes.
    Latin1,
}

impl Encoding {
    /// Name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin-1",
        }
    }
}

/// Description of the corpus line format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusFormat {
    /// Regex matching a token line; capture groups map to `columns`.
    pub line_machine: String,

    /// Names of the capture groups, in order.
    pub columns: Vec<String>,

    /// Template for the token type, with `{column}` placeholders.
    pub type_format: String,

    /// Column holding the position of the token in its sentence.
    pub id_column: String,

    /// Column holding the lemma.
    pub lemma_column: String,

    /// Column holding the part-of-speech tag.
    pub pos_column: String,

    /// Column holding the position of the syntactic head.
    pub head_column: String,

    /// Column holding the dependency relation.
    pub relation_column: String,
}

impl Default for CorpusFormat {
    fn default() -> Self {
        Self {
            line_machine: DEFAULT_LINE_MACHINE.to_string(),
            columns: ["word", "pos", "lemma", "id", "head", "deprel"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            type_format: "{lemma}/{pos}".to_string(),
            id_column: "id".to_string(),
            lemma_column: "lemma".to_string(),
            pos_column: "pos".to_string(),
            head_column: "head".to_string(),
            relation_column: "deprel".to_string(),
        }
    }
}

impl CorpusFormat {
    /// Whether the format declares the given column.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Whether the format carries everything the dependency graph needs.
    pub fn supports_dependencies(&self) -> bool {
        [&self.id_column, &self.head_column, &self.relation_column]
            .iter()
            .all(|c| self.has_column(c))
    }
}

/// Extraction settings, validated once before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Lines to the left of the target, boundary lines included.
    pub left_span: usize,

    /// Lines to the right of the target, boundary lines included.
    pub right_span: usize,

    /// Whether to compute dependency paths.
    pub dependency_mode: bool,

    /// Sentence boundary policy.
    pub sentence_boundary: SentenceBoundary,

    /// Regex for boundary lines, used with [`SentenceBoundary::Pattern`].
    pub boundary_pattern: Option<String>,

    /// Corpus file encoding.
    pub encoding: Encoding,

    /// Files processed in parallel by the async batch driver.
    pub concurrency: usize,

    /// Whether a failing file stops the whole batch.
    pub continue_on_error: bool,

    /// Corpus line format.
    pub format: CorpusFormat,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            left_span: DEFAULT_LEFT_SPAN,
            right_span: DEFAULT_RIGHT_SPAN,
            dependency_mode: false,
            sentence_boundary: SentenceBoundary::NonText,
            boundary_pattern: None,
            encoding: Encoding::Latin1,
            concurrency: DEFAULT_CONCURRENCY,
            continue_on_error: true,
            format: CorpusFormat::default(),
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from `CONTEXTWORDS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load configuration from an optional file layered under the environment.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `CONTEXTWORDS_FORMAT__TYPE_FORMAT`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Set the window spans.
    pub fn with_spans(mut self, left: usize, right: usize) -> Self {
        self.left_span = left;
        self.right_span = right;
        self
    }

    /// Enable or disable dependency paths.
    pub fn with_dependency_mode(mut self, enabled: bool) -> Self {
        self.dependency_mode = enabled;
        self
    }

    /// Set the sentence boundary policy.
    pub fn with_sentence_boundary(mut self, boundary: SentenceBoundary) -> Self {
        self.sentence_boundary = boundary;
        self
    }

    /// Check the settings for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let format = &self.format;
        if format.line_machine.trim().is_empty() {
            return Err(ConfigError::Invalid("line_machine is empty".to_string()));
        }
        if format.columns.is_empty() {
            return Err(ConfigError::Invalid("no columns declared".to_string()));
        }
        for column in [&format.id_column, &format.lemma_column] {
            if !format.has_column(column) {
                return Err(ConfigError::Invalid(format!(
                    "column {column:?} is not declared in columns"
                )));
            }
        }
        if self.dependency_mode && !format.supports_dependencies() {
            return Err(ConfigError::Invalid(format!(
                "dependency mode needs the columns {:?}, {:?} and {:?}",
                format.id_column, format.head_column, format.relation_column
            )));
        }
        if self.sentence_boundary == SentenceBoundary::Pattern
            && self.boundary_pattern.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::Invalid(
                "sentence_boundary = pattern requires boundary_pattern".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractionConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.format.supports_dependencies());
    }

    #[test]
    fn test_dependency_mode_requires_head_column() {
        let mut config = ExtractionConfig::default().with_dependency_mode(true);
        config.format.columns.retain(|c| c != "head");

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pattern_boundary_requires_pattern() {
        let mut config =
            ExtractionConfig::default().with_sentence_boundary(SentenceBoundary::Pattern);
        assert!(config.validate().is_err());

        config.boundary_pattern = Some("^</s>$".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = ExtractionConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "left_span": 3, "right_span": 5, "dependency_mode": true, "encoding": "utf8" }"#,
        )
        .unwrap();

        let config = ExtractionConfig::load(Some(&path)).unwrap();

        assert_eq!(config.left_span, 3);
        assert_eq!(config.right_span, 5);
        assert!(config.dependency_mode);
        assert_eq!(config.encoding, Encoding::Utf8);
        assert_eq!(config.format.type_format, "{lemma}/{pos}");
    }
}
