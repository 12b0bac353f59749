//! Recommendation rotation
//!
//! Keeps one generation's worth of candidate titles and tracks which of them
//! the pair has dismissed. The display window is always derived on read, so
//! there is no cached view to fall out of sync.

use std::collections::HashSet;

/// Number of recommendations displayed at once.
pub const WINDOW_SIZE: usize = 5;

/// Number of candidates requested from the model per generation.
pub const CANDIDATE_COUNT: usize = 7;

#[derive(Debug, Clone, Default)]
pub struct Rotation {
    candidates: Vec<String>,
    viewed: HashSet<String>,
}

impl Rotation {
    /// Replaces the candidate pool wholesale and forgets every viewed mark.
    /// Duplicate titles collapse to their first occurrence, preserving order.
    pub fn set_candidates(&mut self, titles: Vec<String>) {
        self.candidates.clear();
        self.viewed.clear();
        for title in titles {
            if !self.candidates.contains(&title) {
                self.candidates.push(title);
            }
        }
    }

    /// Unviewed candidates in generation order, capped at [`WINDOW_SIZE`].
    pub fn current_window(&self) -> Vec<String> {
        self.candidates
            .iter()
            .filter(|title| !self.viewed.contains(*title))
            .take(WINDOW_SIZE)
            .cloned()
            .collect()
    }

    /// Marks a candidate as seen. Unknown titles and repeat marks change
    /// nothing and return `false`.
    pub fn mark_viewed(&mut self, title: &str) -> bool {
        if !self.candidates.iter().any(|c| c == title) || self.viewed.contains(title) {
            return false;
        }
        self.viewed.insert(title.to_string());
        true
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Candidates not yet dismissed, without the window cap.
    pub fn remaining(&self) -> usize {
        self.candidates.len() - self.viewed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn seven() -> Vec<String> {
        titles(&["A", "B", "C", "D", "E", "F", "G"])
    }

    #[test]
    fn test_window_caps_at_five() {
        let mut rotation = Rotation::default();
        rotation.set_candidates(seven());

        assert_eq!(rotation.current_window(), titles(&["A", "B", "C", "D", "E"]));
        assert_eq!(rotation.candidate_count(), 7);
        assert_eq!(rotation.remaining(), 7);
    }

    #[test]
    fn test_window_shrinks_as_pool_drains() {
        let mut rotation = Rotation::default();
        rotation.set_candidates(seven());

        // Three dismissals leave four unviewed, under the cap.
        assert!(rotation.mark_viewed("A"));
        assert!(rotation.mark_viewed("C"));
        assert!(rotation.mark_viewed("E"));

        assert_eq!(rotation.current_window(), titles(&["B", "D", "F", "G"]));
        assert_eq!(rotation.remaining(), 4);
    }

    #[test]
    fn test_window_size_is_min_of_cap_and_unviewed() {
        let mut rotation = Rotation::default();
        rotation.set_candidates(seven());

        for count in 1..=7 {
            let title = rotation.current_window()[0].clone();
            rotation.mark_viewed(&title);
            let unviewed = 7 - count;
            assert_eq!(rotation.current_window().len(), unviewed.min(WINDOW_SIZE));
        }

        assert!(rotation.current_window().is_empty());
        assert_eq!(rotation.remaining(), 0);
    }

    #[test]
    fn test_viewed_title_is_replaced_by_next_candidate() {
        let mut rotation = Rotation::default();
        rotation.set_candidates(seven());

        rotation.mark_viewed("B");
        assert_eq!(rotation.current_window(), titles(&["A", "C", "D", "E", "F"]));
    }

    #[test]
    fn test_mark_viewed_unknown_title_is_noop() {
        let mut rotation = Rotation::default();
        rotation.set_candidates(seven());

        assert!(!rotation.mark_viewed("Z"));
        assert_eq!(rotation.remaining(), 7);
        assert_eq!(rotation.current_window().len(), 5);
    }

    #[test]
    fn test_mark_viewed_twice_is_noop() {
        let mut rotation = Rotation::default();
        rotation.set_candidates(seven());

        assert!(rotation.mark_viewed("A"));
        assert!(!rotation.mark_viewed("A"));
        assert_eq!(rotation.remaining(), 6);
    }

    #[test]
    fn test_set_candidates_clears_viewed_marks() {
        let mut rotation = Rotation::default();
        rotation.set_candidates(titles(&["A", "B"]));
        rotation.mark_viewed("A");

        rotation.set_candidates(titles(&["A", "C"]));
        assert_eq!(rotation.remaining(), 2);
        assert_eq!(rotation.current_window(), titles(&["A", "C"]));
    }

    #[test]
    fn test_set_candidates_dedupes_preserving_order() {
        let mut rotation = Rotation::default();
        rotation.set_candidates(titles(&["A", "B", "A", "C", "B"]));

        assert_eq!(rotation.candidate_count(), 3);
        assert_eq!(rotation.current_window(), titles(&["A", "B", "C"]));
    }

    #[test]
    fn test_small_pool_window_is_whole_pool() {
        let mut rotation = Rotation::default();
        rotation.set_candidates(titles(&["A", "B", "C"]));

        assert_eq!(rotation.current_window(), titles(&["A", "B", "C"]));
    }

    #[test]
    fn test_empty_rotation() {
        let rotation = Rotation::default();
        assert!(rotation.is_empty());
        assert!(rotation.current_window().is_empty());
        assert_eq!(rotation.remaining(), 0);
    }
}
