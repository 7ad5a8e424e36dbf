//! Sentence dependency graph.
//!
//! Reconstructs the sentence around a target line from the position ids of
//! the surrounding lines and stores it as a directed graph, edges running
//! from head to dependent and labelled with the relation.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::matcher::LineMatcher;
use crate::types::TokenLine;

/// Attributes of one token in a sentence graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenNode {
    /// Position of the token in its sentence.
    pub position: usize,
    /// Lemma, if the corpus provides one.
    pub lemma: Option<String>,
    /// Part-of-speech tag.
    pub pos: Option<String>,
    /// Zero-based line index in the source file.
    pub line: usize,
}

/// Directed attributed graph of one sentence, keyed by sentence position.
#[derive(Debug, Clone, Default)]
pub struct SentenceGraph {
    graph: DiGraph<TokenNode, String>,
    index: HashMap<usize, NodeIndex>,
}

impl SentenceGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph of the sentence containing line `target`.
    ///
    /// Walks outwards from the target while each line's position id keeps
    /// the target's progression (`id(i) - id(target) == i - target`). Lines
    /// that do not match, or whose id does not parse, end the run.
    ///
    /// Returns `None` when the target line itself is not a token line.
    pub fn build<M>(lines: &[String], target: usize, matcher: &M) -> Option<Self>
    where
        M: LineMatcher + ?Sized,
    {
        let target_token = matcher.match_line(lines.get(target)?)?;
        let target_position = target_token.position?;

        let mut tokens = vec![(target, target_token)];

        // Left of the target
        for (offset, i) in (0..target).rev().enumerate() {
            let Some(expected) = target_position.checked_sub(offset + 1) else {
                break;
            };
            match matcher.match_line(&lines[i]) {
                Some(token) if token.position == Some(expected) => tokens.push((i, token)),
                _ => break,
            }
        }

        // Right of the target
        for (offset, i) in (target + 1..lines.len()).enumerate() {
            let expected = target_position + offset + 1;
            match matcher.match_line(&lines[i]) {
                Some(token) if token.position == Some(expected) => tokens.push((i, token)),
                _ => break,
            }
        }

        tokens.sort_by_key(|(line, _)| *line);
        Some(Self::from_tokens(tokens))
    }

    /// Build a graph from `(line index, token)` pairs of a single sentence.
    ///
    /// Tokens without a position are skipped. Heads that point outside the
    /// given tokens produce no edge.
    pub fn from_tokens(tokens: impl IntoIterator<Item = (usize, TokenLine)>) -> Self {
        let mut graph = Self::new();
        let mut heads = Vec::new();

        for (line, token) in tokens {
            let Some(position) = token.position else {
                continue;
            };
            graph.add_node(TokenNode {
                position,
                lemma: token.lemma,
                pos: token.pos,
                line,
            });
            if let Some(head) = token.head {
                heads.push((head, position, token.relation.unwrap_or_default()));
            }
        }

        for (head, dependent, relation) in heads {
            graph.add_edge(head, dependent, relation);
        }

        graph
    }

    /// Add a node. A node already present at the same position is replaced.
    pub fn add_node(&mut self, node: TokenNode) {
        match self.index.get(&node.position) {
            Some(&idx) => self.graph[idx] = node,
            None => {
                let position = node.position;
                let idx = self.graph.add_node(node);
                self.index.insert(position, idx);
            }
        }
    }

    /// Add a head → dependent edge. Returns `false` if either end is missing
    /// or the edge would be a self-loop.
    pub fn add_edge(&mut self, head: usize, dependent: usize, relation: impl Into<String>) -> bool {
        if head == dependent {
            return false;
        }
        match (self.index.get(&head), self.index.get(&dependent)) {
            (Some(&h), Some(&d)) => {
                self.graph.update_edge(h, d, relation.into());
                true
            }
            _ => false,
        }
    }

    /// Whether the sentence has a token at `position`.
    pub fn contains(&self, position: usize) -> bool {
        self.index.contains_key(&position)
    }

    /// Get the token at `position`.
    pub fn node(&self, position: usize) -> Option<&TokenNode> {
        self.index.get(&position).map(|&idx| &self.graph[idx])
    }

    /// Lemma of the token at `position`, empty when absent.
    pub fn lemma(&self, position: usize) -> &str {
        self.node(position)
            .and_then(|node| node.lemma.as_deref())
            .unwrap_or("")
    }

    /// Relation of the `head → dependent` edge, if there is one.
    pub fn relation(&self, head: usize, dependent: usize) -> Option<&str> {
        let h = *self.index.get(&head)?;
        let d = *self.index.get(&dependent)?;
        self.graph.find_edge(h, d).map(|e| self.graph[e].as_str())
    }

    /// Heads of the token at `position`, in position order.
    pub fn predecessors(&self, position: usize) -> Vec<usize> {
        self.neighbors(position, Direction::Incoming)
    }

    /// Dependents of the token at `position`, in position order.
    pub fn successors(&self, position: usize) -> Vec<usize> {
        self.neighbors(position, Direction::Outgoing)
    }

    fn neighbors(&self, position: usize, direction: Direction) -> Vec<usize> {
        let Some(&idx) = self.index.get(&position) else {
            return Vec::new();
        };
        let mut positions: Vec<usize> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].position)
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions
    }

    /// All positions, ascending.
    pub fn positions(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = self.index.keys().copied().collect();
        positions.sort_unstable();
        positions
    }

    /// Number of tokens.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::RegexLineMatcher;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn corpus() -> Vec<String> {
        lines(&[
            "<s>",
            "the\tDT\tthe\t1\t2\tdet",
            "cat\tNN\tcat\t2\t3\tnsubj",
            "eats\tVBZ\teat\t3\t0\tROOT",
            "fish\tNN\tfish\t4\t3\tdobj",
            "</s>",
            "<s>",
            "dogs\tNNS\tdog\t1\t2\tnsubj",
            "bark\tVBP\tbark\t2\t0\tROOT",
            "</s>",
        ])
    }

    #[test]
    fn test_build_collects_sentence() {
        let matcher = RegexLineMatcher::default();
        let graph = SentenceGraph::build(&corpus(), 3, &matcher).unwrap();

        assert_eq!(graph.positions(), vec![1, 2, 3, 4]);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.lemma(3), "eat");
        assert_eq!(graph.relation(3, 4), Some("dobj"));
        assert_eq!(graph.relation(4, 3), None);
        assert_eq!(graph.successors(3), vec![2, 4]);
        assert_eq!(graph.predecessors(1), vec![2]);
        assert_eq!(graph.node(4).map(|n| n.line), Some(4));
    }

    #[test]
    fn test_build_stops_at_sentence_edge() {
        let matcher = RegexLineMatcher::default();
        let graph = SentenceGraph::build(&corpus(), 8, &matcher).unwrap();

        assert_eq!(graph.positions(), vec![1, 2]);
        assert_eq!(graph.lemma(1), "dog");
    }

    #[test]
    fn test_build_without_delimiters() {
        // Two sentences back to back, only the id reset separates them
        let raw = lines(&[
            "a\tDT\ta\t1\t2\tdet",
            "dog\tNN\tdog\t2\t0\tROOT",
            "it\tPRP\tit\t1\t2\tnsubj",
            "runs\tVBZ\trun\t2\t0\tROOT",
        ]);
        let matcher = RegexLineMatcher::default();
        let graph = SentenceGraph::build(&raw, 3, &matcher).unwrap();

        assert_eq!(graph.positions(), vec![1, 2]);
        assert_eq!(graph.lemma(1), "it");
    }

    #[test]
    fn test_build_rejects_non_text_target() {
        let matcher = RegexLineMatcher::default();
        assert!(SentenceGraph::build(&corpus(), 0, &matcher).is_none());
        assert!(SentenceGraph::build(&corpus(), 99, &matcher).is_none());
    }

    #[test]
    fn test_missing_lemma_renders_empty() {
        let mut graph = SentenceGraph::new();
        graph.add_node(TokenNode {
            position: 1,
            lemma: None,
            pos: None,
            line: 0,
        });
        assert_eq!(graph.lemma(1), "");
        assert_eq!(graph.lemma(7), "");
        assert!(!graph.add_edge(1, 1, "self"));
        assert!(!graph.add_edge(1, 2, "dangling"));
    }
}
