//! Structured dependency paths.
//!
//! A path starts at an origin token and continues through a list of
//! segments, each entered through a relation. It is rendered to text only at
//! the output boundary:
//!
//! ```text
//! cat->nsubj:#T
//! #T->dobj:fish->amod:fresh
//! bark->[nsubj:#T,advmod:loudly]
//! ```
//!
//! The bracketed form is the branch fallback used when a new token cannot be
//! chained onto either end of its anchor's path. Such paths are approximate.
//!
//! The fallback always splits off the last top-level segment, so an anchor
//! ending in a bracket is nested whole: `a->[m,r:x]` branched with `r3:z`
//! becomes `a->[[m,r:x],r3:z]`, never a split inside the existing bracket.

/// Marker rendered for the target token.
pub const TARGET_MARKER: &str = "#T";

/// Marker rendered for the context word in implicit paths.
pub const CONTEXT_MARKER: &str = "Cw";

const ARROW: &str = "->";

/// One step of a dependency path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `<relation>:<label of node>`
    Link { relation: String, node: usize },
    /// `[<main>,<side>]`, each side a chain of segments.
    Branch {
        main: Vec<Segment>,
        side: Vec<Segment>,
    },
}

impl Segment {
    fn link(relation: &str, node: usize) -> Self {
        Segment::Link {
            relation: relation.to_string(),
            node,
        }
    }

    fn render<F>(&self, label: &F, out: &mut String)
    where
        F: Fn(usize) -> String,
    {
        match self {
            Segment::Link { relation, node } => {
                out.push_str(relation);
                out.push(':');
                out.push_str(&label(*node));
            }
            Segment::Branch { main, side } => {
                out.push('[');
                render_chain(main, label, out);
                out.push(',');
                render_chain(side, label, out);
                out.push(']');
            }
        }
    }
}

fn render_chain<F>(segments: &[Segment], label: &F, out: &mut String)
where
    F: Fn(usize) -> String,
{
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push_str(ARROW);
        }
        segment.render(label, out);
    }
}

/// Insert `new` right after the link to `anchor`, searching branches too.
fn insert_after(segments: &mut Vec<Segment>, anchor: usize, new: &Segment) -> bool {
    for i in 0..segments.len() {
        if matches!(&segments[i], Segment::Link { node, .. } if *node == anchor) {
            segments.insert(i + 1, new.clone());
            return true;
        }
        if let Segment::Branch { main, side } = &mut segments[i] {
            if insert_after(main, anchor, new) || insert_after(side, anchor, new) {
                return true;
            }
        }
    }
    false
}

/// A dependency path between a context token and the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyPath {
    origin: usize,
    segments: Vec<Segment>,
}

impl DependencyPath {
    /// Single-edge path `head -> relation:dependent`.
    pub fn edge(head: usize, relation: &str, dependent: usize) -> Self {
        Self {
            origin: head,
            segments: vec![Segment::link(relation, dependent)],
        }
    }

    /// Token the rendered path starts with.
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Segments after the origin.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Extend on the head side: `head -> relation:<this path>`.
    pub fn prepend(&self, head: usize, relation: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(Segment::link(relation, self.origin));
        segments.extend(self.segments.iter().cloned());
        Self {
            origin: head,
            segments,
        }
    }

    /// Chain `relation:node` directly after the link that reaches `anchor`.
    ///
    /// Returns `None` when no link reaches `anchor`.
    pub fn splice_after(&self, anchor: usize, relation: &str, node: usize) -> Option<Self> {
        let mut segments = self.segments.clone();
        if insert_after(&mut segments, anchor, &Segment::link(relation, node)) {
            Some(Self {
                origin: self.origin,
                segments,
            })
        } else {
            None
        }
    }

    /// Branch fallback: `<left>->[<last segment>,relation:node]`.
    pub fn branch(&self, relation: &str, node: usize) -> Self {
        let mut segments = self.segments.clone();
        let added = Segment::link(relation, node);
        match segments.pop() {
            Some(last) => segments.push(Segment::Branch {
                main: vec![last],
                side: vec![added],
            }),
            None => segments.push(added),
        }
        Self {
            origin: self.origin,
            segments,
        }
    }

    /// Whether the path went through the branch fallback.
    pub fn is_approximate(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Branch { .. }))
    }

    /// Render the path with the given label function.
    pub fn render<F>(&self, label: F) -> String
    where
        F: Fn(usize) -> String,
    {
        let mut out = label(self.origin);
        for segment in &self.segments {
            out.push_str(ARROW);
            segment.render(&label, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn label(node: usize) -> String {
        match node {
            0 => TARGET_MARKER.to_string(),
            n => format!("w{n}"),
        }
    }

    #[test]
    fn test_render_edge() {
        assert_eq!(DependencyPath::edge(0, "dobj", 4).render(label), "#T->dobj:w4");
        assert_eq!(DependencyPath::edge(1, "nsubj", 0).render(label), "w1->nsubj:#T");
    }

    #[test]
    fn test_prepend() {
        let path = DependencyPath::edge(2, "nsubj", 0).prepend(5, "aux");
        assert_eq!(path.render(label), "w5->aux:w2->nsubj:#T");
        assert_eq!(path.origin(), 5);
    }

    #[test]
    fn test_splice_after_anchor() {
        let path = DependencyPath::edge(0, "dobj", 4)
            .splice_after(4, "amod", 5)
            .unwrap();
        assert_eq!(path.render(label), "#T->dobj:w4->amod:w5");

        let inner = DependencyPath::edge(0, "dobj", 4)
            .splice_after(4, "amod", 5)
            .unwrap()
            .splice_after(4, "det", 6)
            .unwrap();
        assert_eq!(inner.render(label), "#T->dobj:w4->det:w6->amod:w5");
        assert!(!inner.is_approximate());
    }

    #[test]
    fn test_splice_missing_anchor() {
        let path = DependencyPath::edge(0, "dobj", 4);
        assert!(path.splice_after(9, "amod", 5).is_none());
    }

    #[test]
    fn test_branch() {
        let path = DependencyPath::edge(2, "nsubj", 0).branch("advmod", 3);
        assert_eq!(path.render(label), "w2->[nsubj:#T,advmod:w3]");
        assert!(path.is_approximate());

        let nested = path.branch("punct", 7);
        assert_eq!(nested.render(label), "w2->[[nsubj:#T,advmod:w3],punct:w7]");
    }

    #[test]
    fn test_branch_nests_whole_bracket() {
        let path = DependencyPath::edge(2, "nsubj", 0)
            .branch("dobj", 3)
            .splice_after(3, "amod", 8)
            .unwrap()
            .branch("punct", 7);
        assert_eq!(
            path.render(label),
            "w2->[[nsubj:#T,dobj:w3->amod:w8],punct:w7]"
        );
    }

    #[test]
    fn test_splice_inside_branch() {
        let path = DependencyPath::edge(2, "nsubj", 0)
            .branch("dobj", 3)
            .splice_after(3, "amod", 8)
            .unwrap();
        assert_eq!(path.render(label), "w2->[nsubj:#T,dobj:w3->amod:w8]");
    }
}
