//! Sentence dependency graphs and dependency paths.
//!
//! This module provides:
//! - Reconstruction of the sentence around a target line as a directed graph
//! - Structured dependency paths with explicit and implicit rendering
//! - Frontier expansion assigning hop distances and paths to every token

pub mod path;
pub mod path_finder;
pub mod sentence_graph;

pub use path::{DependencyPath, Segment, CONTEXT_MARKER, TARGET_MARKER};
pub use path_finder::{FrontierStep, PathFinder};
pub use sentence_graph::{SentenceGraph, TokenNode};
