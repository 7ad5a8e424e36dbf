//! Regex-driven line matcher configured by a [`CorpusFormat`].

use lazy_static::lazy_static;
use regex::Regex;

use super::LineMatcher;
use crate::error::ConfigError;
use crate::types::{CorpusFormat, TokenLine};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([^{}]+)\}").unwrap();
}

/// Piece of a compiled type template.
#[derive(Debug, Clone)]
enum TemplatePart {
    Literal(String),
    Column(String),
}

/// Line matcher backed by a regex whose capture groups are the columns.
#[derive(Debug, Clone)]
pub struct RegexLineMatcher {
    pattern: Regex,
    format: CorpusFormat,
    type_template: Vec<TemplatePart>,
}

impl RegexLineMatcher {
    /// Compile a matcher for the given corpus format.
    pub fn new(format: &CorpusFormat) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&format.line_machine)?;

        let groups = pattern.captures_len() - 1;
        if groups != format.columns.len() {
            return Err(ConfigError::Invalid(format!(
                "line pattern has {} capture groups but {} columns are declared",
                groups,
                format.columns.len()
            )));
        }

        let type_template = compile_template(&format.type_format)?;
        for part in &type_template {
            if let TemplatePart::Column(name) = part {
                if !format.has_column(name) {
                    return Err(ConfigError::Invalid(format!(
                        "type_format refers to unknown column {name:?}"
                    )));
                }
            }
        }

        Ok(Self {
            pattern,
            format: format.clone(),
            type_template,
        })
    }
}

impl Default for RegexLineMatcher {
    fn default() -> Self {
        Self::new(&CorpusFormat::default()).expect("default corpus format is valid")
    }
}

impl LineMatcher for RegexLineMatcher {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn match_line(&self, line: &str) -> Option<TokenLine> {
        let captures = self.pattern.captures(line)?;

        let fields: Vec<(String, String)> = self
            .format
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let value = captures.get(i + 1).map_or("", |m| m.as_str());
                (column.clone(), value.to_string())
            })
            .collect();

        let get = |column: &str| {
            fields
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, value)| value.clone())
        };

        let position = get(&self.format.id_column).and_then(|v| v.trim().parse().ok());
        // Head 0 is the root marker
        let head = get(&self.format.head_column)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&h| h > 0);

        Some(TokenLine {
            position,
            lemma: get(&self.format.lemma_column),
            pos: get(&self.format.pos_column),
            head,
            relation: get(&self.format.relation_column),
            fields,
        })
    }

    fn token_type(&self, token: &TokenLine) -> String {
        self.type_template
            .iter()
            .map(|part| match part {
                TemplatePart::Literal(text) => text.as_str(),
                TemplatePart::Column(name) => token.field(name).unwrap_or(""),
            })
            .collect()
    }

    fn columns(&self) -> &[String] {
        &self.format.columns
    }
}

/// Split a `{column}` template into literal and column parts.
fn compile_template(template: &str) -> Result<Vec<TemplatePart>, ConfigError> {
    let mut parts = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            parts.push(TemplatePart::Literal(template[last..whole.start()].to_string()));
        }
        parts.push(TemplatePart::Column(name.as_str().to_string()));
        last = whole.end();
    }
    if last < template.len() {
        parts.push(TemplatePart::Literal(template[last..].to_string()));
    }

    if !parts.iter().any(|p| matches!(p, TemplatePart::Column(_))) {
        return Err(ConfigError::Invalid(format!(
            "type_format {template:?} has no column placeholder"
        )));
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_default_format() {
        let matcher = RegexLineMatcher::default();
        let token = matcher.match_line("cats\tNNS\tcat\t1\t3\tnsubj").unwrap();

        assert_eq!(token.position, Some(1));
        assert_eq!(token.lemma.as_deref(), Some("cat"));
        assert_eq!(token.pos.as_deref(), Some("N"));
        assert_eq!(token.head, Some(3));
        assert_eq!(token.relation.as_deref(), Some("nsubj"));
        assert_eq!(token.field("word"), Some("cats"));
        assert_eq!(matcher.token_type(&token), "cat/N");
    }

    #[test]
    fn test_root_head_is_none() {
        let matcher = RegexLineMatcher::default();
        let token = matcher.match_line("eats\tVBZ\teat\t3\t0\tROOT").unwrap();
        assert_eq!(token.head, None);
    }

    #[test]
    fn test_non_text_lines() {
        let matcher = RegexLineMatcher::default();
        assert!(matcher.match_line("<s>").is_none());
        assert!(matcher.match_line("</s>").is_none());
        assert!(matcher.match_line("").is_none());
        assert_eq!(matcher.position("<s id=\"1\">"), None);
    }

    #[test]
    fn test_column_count_mismatch() {
        let format = CorpusFormat {
            columns: vec!["word".to_string(), "lemma".to_string(), "id".to_string()],
            ..Default::default()
        };
        assert!(RegexLineMatcher::new(&format).is_err());
    }

    #[test]
    fn test_unknown_type_column() {
        let format = CorpusFormat {
            type_format: "{lemma}/{tag}".to_string(),
            ..Default::default()
        };
        assert!(RegexLineMatcher::new(&format).is_err());
    }

    #[test]
    fn test_custom_template() {
        let format = CorpusFormat {
            type_format: "{word}_{lemma}".to_string(),
            ..Default::default()
        };
        let matcher = RegexLineMatcher::new(&format).unwrap();
        let token = matcher.match_line("fish\tNN\tfish\t4\t3\tdobj").unwrap();
        assert_eq!(matcher.token_type(&token), "fish_fish");
    }
}
