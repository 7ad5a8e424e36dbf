//! Corpus file selection.
//!
//! Expands the paths given on the command line into the list of corpus
//! files to search, filtering by extension and skipping hidden entries.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Configuration for corpus file selection.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Accepted extensions, lowercase and without the dot. Empty accepts all.
    pub extensions: HashSet<String>,
    /// Whether to include hidden files (starting with .).
    pub include_hidden: bool,
    /// Whether to descend into subdirectories.
    pub recursive: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            include_hidden: false,
            recursive: true,
        }
    }
}

fn default_extensions() -> HashSet<String> {
    ["conll", "conllu", "txt", "tsv", "vrt", "xml"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// File filter for determining which corpus files to read.
#[derive(Debug, Clone)]
pub struct FileFilter {
    config: FilterConfig,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl FileFilter {
    /// Create a new file filter with the given configuration.
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Check if a file should be read.
    ///
    /// Returns `Ok(())` if the file should be read, or `Err(reason)` if it should be skipped.
    pub fn should_process(&self, path: &Path) -> Result<(), String> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| "No file name".to_string())?;

        if !self.config.include_hidden && filename.starts_with('.') {
            return Err("Hidden file".to_string());
        }

        if !self.config.extensions.is_empty() {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .unwrap_or_default();
            if !self.config.extensions.contains(&ext) {
                return Err(format!("Excluded extension: {:?}", ext));
            }
        }

        Ok(())
    }

    /// Expand files and directories into a sorted list of corpus files.
    ///
    /// Files given explicitly are kept even when their extension is not in
    /// the accepted set.
    pub fn collect(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_dir() {
                self.walk(path, &mut files);
            } else {
                files.push(path.clone());
            }
        }
        files.sort();
        files.dedup();
        files
    }

    fn walk(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Cannot read directory, skipping");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                let hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.starts_with('.'));
                if self.config.recursive && (self.config.include_hidden || !hidden) {
                    self.walk(&path, files);
                }
            } else if self.should_process(&path).is_ok() {
                files.push(path);
            }
        }
    }
}
