//! Sentence boundaries inside an extraction window.

/// Boundary lines of one window, as sorted line indices.
#[derive(Debug, Clone, Default)]
pub struct SentenceBoundaries {
    lines: Vec<usize>,
}

impl SentenceBoundaries {
    /// Boundaries at the given line indices.
    pub fn new(lines: impl IntoIterator<Item = usize>) -> Self {
        let mut lines: Vec<usize> = lines.into_iter().collect();
        lines.sort_unstable();
        lines.dedup();
        Self { lines }
    }

    /// No boundaries at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether lines `a` and `b` are not separated by a boundary.
    ///
    /// Only boundaries strictly between the two lines count, so the
    /// relation is reflexive and symmetric.
    pub fn same_sentence(&self, a: usize, b: usize) -> bool {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let first_after = self.lines.partition_point(|&line| line <= lo);
        self.lines.get(first_after).map_or(true, |&line| line >= hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_boundaries_always_same_sentence() {
        let boundaries = SentenceBoundaries::none();
        assert!(boundaries.same_sentence(0, 100));
    }

    #[test]
    fn test_boundary_between_lines() {
        let boundaries = SentenceBoundaries::new([5, 10]);

        assert!(boundaries.same_sentence(6, 9));
        assert!(!boundaries.same_sentence(4, 6));
        assert!(!boundaries.same_sentence(9, 11));
        assert!(!boundaries.same_sentence(2, 12));
    }

    #[test]
    fn test_reflexive_and_symmetric() {
        let boundaries = SentenceBoundaries::new([3, 7, 8]);
        for a in 0..12 {
            assert!(boundaries.same_sentence(a, a));
            for b in 0..12 {
                assert_eq!(boundaries.same_sentence(a, b), boundaries.same_sentence(b, a));
            }
        }
    }

    #[test]
    fn test_endpoints_do_not_count() {
        let boundaries = SentenceBoundaries::new([5]);
        assert!(boundaries.same_sentence(5, 9));
        assert!(boundaries.same_sentence(1, 5));
    }
}
