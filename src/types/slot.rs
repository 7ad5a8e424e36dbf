//! Window slot types produced by the extractor.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Side of a window slot relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "target")]
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "L"),
            Side::Right => write!(f, "R"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// Position of a line in the window around a target.
///
/// Rendered as `target`, or `L<d-1>`/`R<d-1>` for a line at distance `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotPosition {
    pub side: Side,
    pub distance: usize,
}

impl SlotPosition {
    /// Position of line `line` relative to the target at `target`.
    pub fn relative(target: usize, line: usize) -> Self {
        let distance = target.abs_diff(line);
        let side = if distance == 0 {
            Side::Target
        } else if line < target {
            Side::Left
        } else {
            Side::Right
        };
        Self { side, distance }
    }
}

impl fmt::Display for SlotPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Side::Target => write!(f, "target"),
            side => write!(f, "{}{}", side, self.distance - 1),
        }
    }
}

/// Dependency information attached to a same-sentence slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathData {
    /// Hop distance to the target.
    pub steps: usize,
    /// Explicit path.
    pub path: String,
    /// Implicit path, with the context word collapsed to `Cw`.
    pub rep_path: String,
}

/// One row of output: a line in the window around an occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSlot {
    /// Type of the target.
    pub target_lemma: String,
    /// Occurrence identifier of the target.
    pub token_id: String,
    /// Distance in lines from the target.
    pub distance: usize,
    /// Side of the target.
    pub side: Side,
    /// Position code (`target`, `L0`, `R3`, ...).
    pub position: String,
    /// Type of the context word (absent for non-text lines).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cw: Option<String>,
    /// Whether the line belongs to the sentence of the target.
    pub same_sentence: bool,
    /// Corpus columns; non-text lines repeat the raw line in every column.
    pub fields: BTreeMap<String, String>,
    /// Dependency path data (dependency mode, same sentence, reachable).
    #[serde(flatten)]
    pub dependency: Option<PathData>,
}

impl WindowSlot {
    /// Unique row identifier: `<token_id>/<position>`.
    pub fn id(&self) -> String {
        format!("{}/{}", self.token_id, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_codes() {
        assert_eq!(SlotPosition::relative(5, 5).to_string(), "target");
        assert_eq!(SlotPosition::relative(5, 4).to_string(), "L0");
        assert_eq!(SlotPosition::relative(5, 2).to_string(), "L2");
        assert_eq!(SlotPosition::relative(5, 6).to_string(), "R0");

        let pos = SlotPosition::relative(5, 9);
        assert_eq!(pos.side, Side::Right);
        assert_eq!(pos.distance, 4);
    }

    #[test]
    fn test_slot_serialization() {
        let slot = WindowSlot {
            target_lemma: "eat/V".to_string(),
            token_id: "eat/V/c1/3".to_string(),
            distance: 1,
            side: Side::Left,
            position: "L0".to_string(),
            cw: Some("cat/N".to_string()),
            same_sentence: true,
            fields: BTreeMap::new(),
            dependency: Some(PathData {
                steps: 1,
                path: "cat->nsubj:#T".to_string(),
                rep_path: "Cw->nsubj:#T".to_string(),
            }),
        };

        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["side"], "L");
        assert_eq!(json["steps"], 1);
        assert_eq!(json["rep_path"], "Cw->nsubj:#T");
        assert_eq!(slot.id(), "eat/V/c1/3/L0");
    }
}
