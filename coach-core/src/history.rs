//! # Score History Module
//!
//! A capacity-bounded FIFO of recent scores, the data behind the trend
//! display. The sampling loop is the only writer; readers take independent
//! snapshots so a redraw never observes a half-applied append.

use std::collections::VecDeque;

/// Bounded ordered buffer of recent scores, oldest first.
#[derive(Debug)]
pub struct ScoreHistory {
    scores: VecDeque<f32>,
    capacity: usize,
}

impl ScoreHistory {
    /// Creates an empty history holding at most `capacity` scores.
    pub fn new(capacity: usize) -> ScoreHistory {
        ScoreHistory {
            scores: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a score, evicting the oldest entry once full.
    pub fn push(&mut self, score: f32) {
        if self.scores.len() >= self.capacity {
            self.scores.pop_front();
        }
        self.scores.push_back(score);
    }

    /// The most recently appended score.
    pub fn latest(&self) -> Option<f32> {
        self.scores.back().copied()
    }

    /// Independent copy of the buffer in append order. Later pushes do not
    /// affect a snapshot already taken.
    pub fn snapshot(&self) -> Vec<f32> {
        self.scores.iter().copied().collect()
    }

    /// Number of stored scores.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no scores have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_until_capacity_then_evicts_oldest() {
        let mut history = ScoreHistory::new(150);
        for i in 0..151 {
            history.push(i as f32 / 151.0);
        }
        assert_eq!(history.len(), 150);
        let snapshot = history.snapshot();
        // The very first entry (0.0) was evicted; order is append order.
        assert_eq!(snapshot[0], 1.0 / 151.0);
        assert_eq!(*snapshot.last().unwrap(), 150.0 / 151.0);
    }

    #[test]
    fn snapshot_preserves_append_order() {
        let mut history = ScoreHistory::new(4);
        for &s in &[0.1, 0.2, 0.3] {
            history.push(s);
        }
        assert_eq!(history.snapshot(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn snapshot_is_isolated_from_later_pushes() {
        let mut history = ScoreHistory::new(4);
        history.push(0.5);
        let snapshot = history.snapshot();
        history.push(0.9);
        assert_eq!(snapshot, vec![0.5]);
        assert_eq!(history.latest(), Some(0.9));
    }

    #[test]
    fn empty_history_has_no_latest() {
        let history = ScoreHistory::new(4);
        assert!(history.is_empty());
        assert_eq!(history.latest(), None);
        assert!(history.snapshot().is_empty());
    }

    #[test]
    fn steady_state_eviction_keeps_length_fixed() {
        let mut history = ScoreHistory::new(3);
        for i in 0..10 {
            history.push(i as f32);
            assert!(history.len() <= 3);
        }
        assert_eq!(history.snapshot(), vec![7.0, 8.0, 9.0]);
    }
}
