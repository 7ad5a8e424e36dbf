//! Processing module for corpus file access.
//!
//! This module provides:
//! - Corpus file selection (extensions, hidden files, directory walking)
//! - Decoding with a configured encoding and line splitting

pub mod file_processor;
pub mod filter;

pub use file_processor::{file_stem, CorpusFile, FileProcessor};
pub use filter::{FileFilter, FilterConfig};
