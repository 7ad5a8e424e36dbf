//! Frontier expansion over a sentence graph.
//!
//! Starting from the target, each round assigns the next hop distance to
//! every unassigned token adjacent (in either direction) to a token reached
//! in the previous round, and derives its path from that anchor's path.
//!
//! Attachment order is a fixed convention: a token attaches as the head of
//! an anchor before it attaches as a dependent of one, and among anchors the
//! lowest sentence position wins. Records of a round are ordered by
//! position.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::path::{DependencyPath, CONTEXT_MARKER, TARGET_MARKER};
use super::sentence_graph::SentenceGraph;
use crate::types::PathData;

/// Path record of one token reached from the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierStep {
    /// Token this record describes.
    pub node: usize,
    /// Head of the edge through which the token was reached.
    pub head: usize,
    /// Dependent of that edge.
    pub dependent: usize,
    /// Hop distance to the target (at least 1).
    pub hops: usize,
    /// Relation of that edge.
    pub relation: String,
    /// Structured path to the target.
    pub path: DependencyPath,
    /// Path with every token lexicalised.
    pub explicit_path: String,
    /// Path with this token rendered as `Cw`.
    pub implicit_path: String,
}

impl FrontierStep {
    /// Whether the path went through the branch fallback.
    pub fn is_approximate(&self) -> bool {
        self.path.is_approximate()
    }

    /// Output columns for this record.
    pub fn path_data(&self) -> PathData {
        PathData {
            steps: self.hops,
            path: self.explicit_path.clone(),
            rep_path: self.implicit_path.clone(),
        }
    }
}

/// Computes path records for every token connected to a target.
pub struct PathFinder<'g> {
    graph: &'g SentenceGraph,
    target: usize,
}

impl<'g> PathFinder<'g> {
    /// Create a path finder for the token at `target`.
    pub fn new(graph: &'g SentenceGraph, target: usize) -> Self {
        Self { graph, target }
    }

    /// Path data of the target itself.
    pub fn target_data() -> PathData {
        PathData {
            steps: 0,
            path: TARGET_MARKER.to_string(),
            rep_path: TARGET_MARKER.to_string(),
        }
    }

    /// Run all rounds. Tokens not connected to the target are left out.
    pub fn find(&self) -> Vec<FrontierStep> {
        if !self.graph.contains(self.target) {
            return Vec::new();
        }

        let mut assigned: HashSet<usize> = HashSet::from([self.target]);
        let mut steps = Vec::new();
        let mut frontier = self.first_round();
        let mut hops = 1;

        while !frontier.is_empty() {
            trace!(hops, reached = frontier.len(), "Frontier round complete");
            assigned.extend(frontier.iter().map(|s| s.node));
            hops += 1;
            let next = self.next_round(&frontier, &assigned, hops);
            steps.append(&mut frontier);
            frontier = next;
        }

        steps
    }

    /// Run all rounds and index the records by sentence position.
    pub fn find_by_node(&self) -> HashMap<usize, FrontierStep> {
        self.find().into_iter().map(|s| (s.node, s)).collect()
    }

    fn first_round(&self) -> Vec<FrontierStep> {
        let target = self.target;
        self.graph
            .positions()
            .into_iter()
            .filter(|&x| x != target)
            .filter_map(|x| {
                if let Some(relation) = self.graph.relation(x, target) {
                    let path = DependencyPath::edge(x, relation, target);
                    Some(self.step(x, x, target, relation, 1, path))
                } else {
                    self.graph.relation(target, x).map(|relation| {
                        let path = DependencyPath::edge(target, relation, x);
                        self.step(x, target, x, relation, 1, path)
                    })
                }
            })
            .collect()
    }

    fn next_round(
        &self,
        anchors: &[FrontierStep],
        assigned: &HashSet<usize>,
        hops: usize,
    ) -> Vec<FrontierStep> {
        self.graph
            .positions()
            .into_iter()
            .filter(|x| !assigned.contains(x))
            .filter_map(|x| {
                let as_head = anchors.iter().find_map(|anchor| {
                    self.graph
                        .relation(x, anchor.node)
                        .map(|relation| (anchor, x, anchor.node, relation))
                });
                let attachment = as_head.or_else(|| {
                    anchors.iter().find_map(|anchor| {
                        self.graph
                            .relation(anchor.node, x)
                            .map(|relation| (anchor, anchor.node, x, relation))
                    })
                });

                attachment.map(|(anchor, head, dependent, relation)| {
                    let path = Self::extend(anchor, head, dependent, relation);
                    self.step(x, head, dependent, relation, hops, path)
                })
            })
            .collect()
    }

    /// Derive the path of a new token from its anchor's path.
    fn extend(anchor: &FrontierStep, head: usize, dependent: usize, relation: &str) -> DependencyPath {
        if dependent == anchor.head {
            // Anchor was reached as a head: chain on the head side
            anchor.path.prepend(head, relation)
        } else if head == anchor.dependent {
            // Anchor was reached as a dependent: chain after its own link
            anchor
                .path
                .splice_after(anchor.node, relation, dependent)
                .unwrap_or_else(|| anchor.path.branch(relation, dependent))
        } else {
            anchor.path.branch(relation, dependent)
        }
    }

    fn step(
        &self,
        node: usize,
        head: usize,
        dependent: usize,
        relation: &str,
        hops: usize,
        path: DependencyPath,
    ) -> FrontierStep {
        let explicit_path = path.render(|n| self.label(n, None));
        let implicit_path = path.render(|n| self.label(n, Some(node)));
        FrontierStep {
            node,
            head,
            dependent,
            hops,
            relation: relation.to_string(),
            path,
            explicit_path,
            implicit_path,
        }
    }

    fn label(&self, node: usize, context: Option<usize>) -> String {
        if node == self.target {
            TARGET_MARKER.to_string()
        } else if context == Some(node) {
            CONTEXT_MARKER.to_string()
        } else {
            self.graph.lemma(node).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::TokenNode;
    use pretty_assertions::assert_eq;

    fn graph(nodes: &[(usize, &str)], edges: &[(usize, usize, &str)]) -> SentenceGraph {
        let mut graph = SentenceGraph::new();
        for &(position, lemma) in nodes {
            graph.add_node(TokenNode {
                position,
                lemma: Some(lemma.to_string()),
                pos: None,
                line: position,
            });
        }
        for &(head, dependent, relation) in edges {
            graph.add_edge(head, dependent, relation);
        }
        graph
    }

    #[test]
    fn test_chain_through_dependent() {
        let g = graph(
            &[(1, "cat"), (3, "eat"), (4, "fish"), (5, "fresh")],
            &[(1, 3, "nsubj"), (3, 4, "dobj"), (4, 5, "amod")],
        );
        let steps = PathFinder::new(&g, 3).find_by_node();

        assert_eq!(steps.len(), 3);
        assert_eq!(steps[&1].hops, 1);
        assert_eq!(steps[&1].explicit_path, "cat->nsubj:#T");
        assert_eq!(steps[&1].implicit_path, "Cw->nsubj:#T");
        assert_eq!(steps[&4].hops, 1);
        assert_eq!(steps[&4].explicit_path, "#T->dobj:fish");
        assert_eq!(steps[&4].implicit_path, "#T->dobj:Cw");
        assert_eq!(steps[&5].hops, 2);
        assert_eq!(steps[&5].explicit_path, "#T->dobj:fish->amod:fresh");
        assert_eq!(steps[&5].implicit_path, "#T->dobj:fish->amod:Cw");
        assert!(!steps[&5].is_approximate());
    }

    #[test]
    fn test_chain_through_head() {
        // cat is the subject of eat, which is the complement of say
        let g = graph(
            &[(1, "we"), (2, "say"), (3, "cat"), (4, "eat")],
            &[(2, 1, "nsubj"), (2, 4, "ccomp"), (4, 3, "nsubj")],
        );
        let steps = PathFinder::new(&g, 3).find_by_node();

        assert_eq!(steps[&4].explicit_path, "eat->nsubj:#T");
        assert_eq!(steps[&2].hops, 2);
        assert_eq!(steps[&2].explicit_path, "say->ccomp:eat->nsubj:#T");
        assert_eq!(steps[&2].implicit_path, "Cw->ccomp:eat->nsubj:#T");
        // sibling of the head: the fallback branch
        assert_eq!(steps[&1].hops, 3);
        assert_eq!(steps[&1].explicit_path, "say->ccomp:eat->[nsubj:#T,nsubj:we]");
        assert!(steps[&1].is_approximate());
    }

    #[test]
    fn test_sibling_uses_branch() {
        let g = graph(
            &[(1, "dog"), (2, "bark"), (3, "loudly")],
            &[(2, 1, "nsubj"), (2, 3, "advmod")],
        );
        let steps = PathFinder::new(&g, 1).find_by_node();

        assert_eq!(steps[&2].explicit_path, "bark->nsubj:#T");
        assert_eq!(steps[&3].hops, 2);
        assert_eq!(steps[&3].explicit_path, "bark->[nsubj:#T,advmod:loudly]");
        assert_eq!(steps[&3].implicit_path, "bark->[nsubj:#T,advmod:Cw]");
        assert!(steps[&3].is_approximate());
    }

    #[test]
    fn test_converging_heads_use_branch() {
        // node 4 heads both anchors 2 and 3: neither slot matches cleanly
        let g = graph(
            &[(1, "give"), (2, "fish"), (3, "cat"), (4, "both")],
            &[(1, 2, "dobj"), (1, 3, "iobj"), (4, 2, "dep"), (4, 3, "dep")],
        );
        let steps = PathFinder::new(&g, 1).find();

        let reached: Vec<usize> = steps.iter().map(|s| s.node).collect();
        assert_eq!(reached, vec![2, 3, 4]);

        let last = &steps[2];
        assert_eq!(last.hops, 2);
        assert_eq!(last.head, 4);
        assert_eq!(last.dependent, 2);
        assert_eq!(last.explicit_path, "#T->[dobj:fish,dep:fish]");
        assert!(last.explicit_path.contains('['));
    }

    #[test]
    fn test_disconnected_nodes_are_omitted() {
        let g = graph(
            &[(1, "eat"), (2, "fish"), (3, "stray")],
            &[(1, 2, "dobj")],
        );
        let steps = PathFinder::new(&g, 1).find();

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].node, 2);
    }

    #[test]
    fn test_hops_increase_along_paths() {
        let g = graph(
            &[(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e")],
            &[(1, 2, "r"), (2, 3, "r"), (3, 4, "r"), (4, 5, "r")],
        );
        let steps = PathFinder::new(&g, 1).find_by_node();

        for node in 2..=5 {
            assert_eq!(steps[&node].hops, node - 1);
        }
        assert_eq!(steps[&5].explicit_path, "#T->r:b->r:c->r:d->r:e");
        assert_eq!(steps[&5].implicit_path, "#T->r:b->r:c->r:d->r:Cw");
    }

    #[test]
    fn test_target_missing_from_graph() {
        let g = graph(&[(1, "a")], &[]);
        assert!(PathFinder::new(&g, 9).find().is_empty());
        assert_eq!(PathFinder::target_data().path, "#T");
    }
}
