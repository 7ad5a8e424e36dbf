//! Batch extraction over many occurrences and corpus files.
//!
//! Occurrences are grouped by the file their identifier points to. Each
//! file is read once, all of its occurrences are extracted, and the file is
//! dropped again. Files are independent units of work: the async driver
//! runs them on the blocking pool and merges their rows by disjoint union.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ExtractError;
use crate::processing::{file_stem, FileProcessor};
use crate::types::{ExtractionConfig, OccurrenceId, WindowSlot};
use crate::window::WindowExtractor;

/// Configuration for batch processing.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum files to process concurrently
    pub concurrency: usize,
    /// Whether to continue when a file cannot be read
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: crate::DEFAULT_CONCURRENCY,
            continue_on_error: true,
        }
    }
}

impl From<&ExtractionConfig> for BatchConfig {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            continue_on_error: config.continue_on_error,
        }
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total_occurrences: usize,
    pub processed_occurrences: usize,
    pub failed_occurrences: usize,
    /// Occurrences whose file stem matched no candidate file.
    pub unresolved_occurrences: usize,
    pub files_read: usize,
    pub files_failed: usize,
    pub total_slots: usize,
    pub errors: Vec<BatchError>,
}

/// Error during batch processing, scoped to a file or an occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    /// File path or occurrence id.
    pub scope: String,
    pub error: String,
}

/// Occurrences located in one corpus file.
#[derive(Debug, Clone)]
struct FileUnit {
    path: PathBuf,
    occurrences: Vec<OccurrenceId>,
}

/// Result of processing one file unit.
struct FileOutcome {
    path: PathBuf,
    occurrences: usize,
    slots: Vec<WindowSlot>,
    failures: Vec<(OccurrenceId, ExtractError)>,
    file_error: Option<ExtractError>,
}

/// Batch driver for window extraction.
pub struct BatchExtractor {
    extractor: Arc<WindowExtractor>,
    processor: FileProcessor,
    config: BatchConfig,
}

impl BatchExtractor {
    /// Create a batch extractor; batch settings come from the extractor's config.
    pub fn new(extractor: WindowExtractor) -> Self {
        let config = BatchConfig::from(extractor.config());
        let processor = FileProcessor::new(extractor.config().encoding);
        Self {
            extractor: Arc::new(extractor),
            processor,
            config,
        }
    }

    /// Override the batch settings.
    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// The window extractor.
    pub fn extractor(&self) -> &WindowExtractor {
        &self.extractor
    }

    /// Extract every occurrence, one file after the other.
    pub fn extract(
        &self,
        target_type: &str,
        occurrences: &[OccurrenceId],
        files: &[PathBuf],
    ) -> Result<(Vec<WindowSlot>, BatchReport)> {
        let (units, unresolved, order) = plan(occurrences, files);
        info!(
            target_type,
            occurrences = order.len(),
            files = units.len(),
            "Starting batch extraction"
        );

        let mut outcomes = Vec::with_capacity(units.len());
        for unit in units {
            let outcome = process_file(&self.extractor, &self.processor, target_type, unit);
            if let Some(e) = &outcome.file_error {
                if !self.config.continue_on_error {
                    return Err(anyhow!("{}: {}", outcome.path.display(), e));
                }
            }
            outcomes.push(outcome);
        }

        Ok(merge(outcomes, unresolved, &order))
    }

    /// Extract every occurrence, processing files concurrently.
    pub async fn extract_concurrent(
        &self,
        target_type: &str,
        occurrences: &[OccurrenceId],
        files: &[PathBuf],
    ) -> Result<(Vec<WindowSlot>, BatchReport)> {
        let (units, unresolved, order) = plan(occurrences, files);
        info!(
            target_type,
            occurrences = order.len(),
            files = units.len(),
            concurrency = self.config.concurrency,
            "Starting concurrent batch extraction"
        );

        let tasks = units.into_iter().map(|unit| {
            let extractor = Arc::clone(&self.extractor);
            let processor = self.processor.clone();
            let target_type = target_type.to_string();
            tokio::task::spawn_blocking(move || {
                process_file(&extractor, &processor, &target_type, unit)
            })
        });

        let joined: Vec<_> = stream::iter(tasks)
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut outcomes = Vec::with_capacity(joined.len());
        for result in joined {
            let outcome = result.map_err(|e| anyhow!("extraction task failed: {}", e))?;
            if let Some(e) = &outcome.file_error {
                if !self.config.continue_on_error {
                    return Err(anyhow!("{}: {}", outcome.path.display(), e));
                }
            }
            outcomes.push(outcome);
        }

        Ok(merge(outcomes, unresolved, &order))
    }
}

/// Group occurrences by file.
///
/// Returns the file units in file order, the occurrences whose stem matched
/// no file, and the input position of every distinct occurrence id.
fn plan(
    occurrences: &[OccurrenceId],
    files: &[PathBuf],
) -> (Vec<FileUnit>, Vec<OccurrenceId>, HashMap<String, usize>) {
    let mut units: Vec<FileUnit> = Vec::new();
    let mut by_stem: HashMap<String, usize> = HashMap::new();

    for path in files {
        let Some(stem) = file_stem(path) else {
            continue;
        };
        if by_stem.contains_key(&stem) {
            warn!(path = %path.display(), stem = %stem, "Duplicate file stem, ignoring file");
            continue;
        }
        by_stem.insert(stem, units.len());
        units.push(FileUnit {
            path: path.clone(),
            occurrences: Vec::new(),
        });
    }

    let mut seen = HashSet::new();
    let mut order = HashMap::new();
    let mut unresolved = Vec::new();

    for occurrence in occurrences {
        if !seen.insert(occurrence.clone()) {
            continue;
        }
        order.insert(occurrence.to_string(), order.len());
        match by_stem.get(&occurrence.file_stem) {
            Some(&unit) => units[unit].occurrences.push(occurrence.clone()),
            None => unresolved.push(occurrence.clone()),
        }
    }

    units.retain(|unit| !unit.occurrences.is_empty());
    (units, unresolved, order)
}

/// Read one file and extract all of its occurrences.
fn process_file(
    extractor: &WindowExtractor,
    processor: &FileProcessor,
    target_type: &str,
    unit: FileUnit,
) -> FileOutcome {
    let occurrences = unit.occurrences.len();
    let file = match processor.load(&unit.path) {
        Ok(file) => file,
        Err(e) => {
            warn!(
                path = %unit.path.display(),
                occurrences,
                error = %e,
                "Failed to read corpus file, skipping its occurrences"
            );
            return FileOutcome {
                path: unit.path,
                occurrences,
                slots: Vec::new(),
                failures: Vec::new(),
                file_error: Some(e),
            };
        }
    };

    let (slots, failures) = extractor.extract_file(target_type, &unit.occurrences, &file);
    for (occurrence, e) in &failures {
        warn!(token_id = %occurrence, error = %e, "Failed to extract occurrence");
    }
    info!(
        path = %unit.path.display(),
        occurrences,
        slots = slots.len(),
        "Processed corpus file"
    );

    FileOutcome {
        path: unit.path,
        occurrences,
        slots,
        failures,
        file_error: None,
    }
}

/// Merge file outcomes into one ordered table and a report.
fn merge(
    outcomes: Vec<FileOutcome>,
    unresolved: Vec<OccurrenceId>,
    order: &HashMap<String, usize>,
) -> (Vec<WindowSlot>, BatchReport) {
    let mut report = BatchReport {
        total_occurrences: order.len(),
        unresolved_occurrences: unresolved.len(),
        ..Default::default()
    };
    let mut slots = Vec::new();

    for occurrence in &unresolved {
        debug!(token_id = %occurrence, "No candidate file for occurrence");
        report.errors.push(BatchError {
            scope: occurrence.to_string(),
            error: format!("no corpus file with stem {:?}", occurrence.file_stem),
        });
    }

    for outcome in outcomes {
        if let Some(e) = outcome.file_error {
            report.files_failed += 1;
            report.failed_occurrences += outcome.occurrences;
            report.errors.push(BatchError {
                scope: outcome.path.display().to_string(),
                error: e.to_string(),
            });
            continue;
        }

        report.files_read += 1;
        report.failed_occurrences += outcome.failures.len();
        report.processed_occurrences += outcome.occurrences - outcome.failures.len();
        for (occurrence, e) in outcome.failures {
            report.errors.push(BatchError {
                scope: occurrence.to_string(),
                error: e.to_string(),
            });
        }
        slots.extend(outcome.slots);
    }

    // Windows stay contiguous and in line order; the sort is stable
    slots.sort_by_key(|slot| order.get(&slot.token_id).copied().unwrap_or(usize::MAX));
    report.total_slots = slots.len();

    info!(
        processed = report.processed_occurrences,
        failed = report.failed_occurrences,
        unresolved = report.unresolved_occurrences,
        slots = report.total_slots,
        "Batch extraction complete"
    );

    (slots, report)
}
