//! Windowed context word extraction.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use super::boundary::SentenceBoundaries;
use crate::dependency::{FrontierStep, PathFinder, SentenceGraph};
use crate::error::{ConfigError, ExtractError, Result};
use crate::matcher::{LineMatcher, RegexLineMatcher};
use crate::processing::CorpusFile;
use crate::types::{
    ExtractionConfig, OccurrenceId, PathData, SentenceBoundary, SlotPosition, TokenLine, WindowSlot,
};

/// Extracts one window of slots per occurrence.
pub struct WindowExtractor {
    matcher: Arc<dyn LineMatcher>,
    config: ExtractionConfig,
    boundary_pattern: Option<Regex>,
}

impl WindowExtractor {
    /// Create an extractor using the regex matcher described by the config.
    pub fn from_config(config: ExtractionConfig) -> std::result::Result<Self, ConfigError> {
        let matcher = RegexLineMatcher::new(&config.format)?;
        Self::new(config, Arc::new(matcher))
    }

    /// Create an extractor with a custom line matcher.
    pub fn new(
        config: ExtractionConfig,
        matcher: Arc<dyn LineMatcher>,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let boundary_pattern = match config.sentence_boundary {
            SentenceBoundary::Pattern => config
                .boundary_pattern
                .as_deref()
                .map(Regex::new)
                .transpose()?,
            _ => None,
        };

        Ok(Self {
            matcher,
            config,
            boundary_pattern,
        })
    }

    /// Override the window spans for this extractor.
    pub fn with_spans(mut self, left: usize, right: usize) -> Self {
        self.config.left_span = left;
        self.config.right_span = right;
        self
    }

    /// The extraction settings.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// The line matcher.
    pub fn matcher(&self) -> &Arc<dyn LineMatcher> {
        &self.matcher
    }

    /// Extract every occurrence located in `file`.
    ///
    /// Occurrences that fail are returned next to the slots; they never stop
    /// the other occurrences of the file.
    pub fn extract_file(
        &self,
        target_type: &str,
        occurrences: &[OccurrenceId],
        file: &CorpusFile,
    ) -> (Vec<WindowSlot>, Vec<(OccurrenceId, ExtractError)>) {
        let mut slots = Vec::new();
        let mut failures = Vec::new();

        for occurrence in occurrences {
            match self.extract_occurrence(target_type, occurrence, file) {
                Ok(window) => slots.extend(window),
                Err(e) => failures.push((occurrence.clone(), e)),
            }
        }

        (slots, failures)
    }

    /// Extract the window around one occurrence.
    pub fn extract_occurrence(
        &self,
        target_type: &str,
        occurrence: &OccurrenceId,
        file: &CorpusFile,
    ) -> Result<Vec<WindowSlot>> {
        let lines = &file.lines;
        let index = occurrence
            .index()
            .ok_or_else(|| ExtractError::InvalidOccurrence {
                id: occurrence.to_string(),
                reason: "line numbers are 1-based",
            })?;
        if index >= lines.len() {
            return Err(ExtractError::OutOfRange {
                id: occurrence.to_string(),
                lines: lines.len(),
            });
        }

        let target_token = self.matcher.match_line(&lines[index]).ok_or_else(|| {
            ExtractError::Match {
                file_stem: file.stem.clone(),
                line: occurrence.line,
            }
        })?;

        let start = index.saturating_sub(self.config.left_span);
        let end = index
            .saturating_add(self.config.right_span)
            .min(lines.len() - 1);

        let tokens: Vec<Option<TokenLine>> = (start..=end)
            .map(|i| {
                if i == index {
                    Some(target_token.clone())
                } else {
                    self.matcher.match_line(&lines[i])
                }
            })
            .collect();

        let boundaries = self.boundaries(lines, start, &tokens);

        let steps = if self.config.dependency_mode {
            self.steps_by_line(file, index, &target_token)?
        } else {
            HashMap::new()
        };

        let token_id = occurrence.to_string();
        let slots: Vec<WindowSlot> = tokens
            .into_iter()
            .enumerate()
            .map(|(offset, token)| {
                let i = start + offset;
                let position = SlotPosition::relative(index, i);
                match token {
                    Some(token) => {
                        let same_sentence = boundaries.same_sentence(i, index);
                        let dependency = if self.config.dependency_mode && same_sentence {
                            if i == index {
                                Some(PathFinder::target_data())
                            } else {
                                steps.get(&i).cloned()
                            }
                        } else {
                            None
                        };
                        WindowSlot {
                            target_lemma: target_type.to_string(),
                            token_id: token_id.clone(),
                            distance: position.distance,
                            side: position.side,
                            position: position.to_string(),
                            cw: Some(self.matcher.token_type(&token)),
                            same_sentence,
                            fields: token.fields.into_iter().collect(),
                            dependency,
                        }
                    }
                    None => WindowSlot {
                        target_lemma: target_type.to_string(),
                        token_id: token_id.clone(),
                        distance: position.distance,
                        side: position.side,
                        position: position.to_string(),
                        cw: None,
                        same_sentence: false,
                        fields: self.raw_fields(&lines[i]),
                        dependency: None,
                    },
                }
            })
            .collect();

        debug!(token_id = %token_id, slots = slots.len(), "Extracted window");
        Ok(slots)
    }

    /// Boundary lines of the window `start..start + tokens.len()`.
    fn boundaries(
        &self,
        lines: &[String],
        start: usize,
        tokens: &[Option<TokenLine>],
    ) -> SentenceBoundaries {
        let non_text = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.is_none())
            .map(|(offset, _)| start + offset);

        match self.config.sentence_boundary {
            SentenceBoundary::Disabled => SentenceBoundaries::none(),
            SentenceBoundary::NonText => SentenceBoundaries::new(non_text),
            SentenceBoundary::Pattern => match &self.boundary_pattern {
                Some(pattern) => SentenceBoundaries::new(
                    non_text.filter(|&i| pattern.is_match(&lines[i])),
                ),
                None => SentenceBoundaries::new(non_text),
            },
        }
    }

    /// Path data of the target's sentence, keyed by line index.
    fn steps_by_line(
        &self,
        file: &CorpusFile,
        index: usize,
        target_token: &TokenLine,
    ) -> Result<HashMap<usize, PathData>> {
        let not_a_token = || ExtractError::Match {
            file_stem: file.stem.clone(),
            line: index + 1,
        };
        let target = target_token.position.ok_or_else(not_a_token)?;
        let graph =
            SentenceGraph::build(&file.lines, index, self.matcher.as_ref()).ok_or_else(not_a_token)?;

        let steps: Vec<FrontierStep> = PathFinder::new(&graph, target).find();
        Ok(steps
            .iter()
            .filter_map(|step| {
                graph
                    .node(step.node)
                    .map(|node| (node.line, step.path_data()))
            })
            .collect())
    }

    /// Every column filled with the raw line, for non-text slots.
    fn raw_fields(&self, line: &str) -> BTreeMap<String, String> {
        self.matcher
            .columns()
            .iter()
            .map(|column| (column.clone(), line.to_string()))
            .collect()
    }
}

/// List the occurrences of `type_name` in a corpus file.
pub fn find_occurrences<M>(matcher: &M, type_name: &str, file: &CorpusFile) -> Vec<OccurrenceId>
where
    M: LineMatcher + ?Sized,
{
    file.lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| {
            let token = matcher.match_line(line)?;
            (matcher.token_type(&token) == type_name)
                .then(|| OccurrenceId::new(type_name, file.stem.clone(), i + 1))
        })
        .collect()
}
