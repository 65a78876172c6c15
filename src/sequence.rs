//! Gap-aware sequence over classified windows.
//!
//! One slot per window id. Instead of a pointer-linked node list, the sequence
//! is an arena of noise flags with precomputed nearest-valid-neighbor index
//! arrays, and circular gap replay is a finite iterator over window ids.

/// Sequence of window slots in id order; a slot is "valid" when its window was
/// classified as noise.
pub struct WindowSequence {
    noise: Vec<bool>,
    prev_valid: Vec<Option<usize>>,
    next_valid: Vec<Option<usize>>,
}

impl WindowSequence {
    /// Build the sequence from per-window noise flags (index == window id).
    pub fn new(noise: Vec<bool>) -> Self {
        let n = noise.len();

        let mut prev_valid = vec![None; n];
        let mut last = None;
        for id in 0..n {
            prev_valid[id] = last;
            if noise[id] {
                last = Some(id);
            }
        }

        let mut next_valid = vec![None; n];
        let mut next = None;
        for id in (0..n).rev() {
            next_valid[id] = next;
            if noise[id] {
                next = Some(id);
            }
        }

        WindowSequence {
            noise,
            prev_valid,
            next_valid,
        }
    }

    pub fn len(&self) -> usize {
        self.noise.len()
    }

    pub fn is_empty(&self) -> bool {
        self.noise.is_empty()
    }

    pub fn is_noise(&self, id: usize) -> bool {
        self.noise[id]
    }

    /// Nearest noise slot strictly before `id`, skipping signal slots.
    pub fn nearest_valid_backward(&self, id: usize) -> Option<usize> {
        self.prev_valid[id]
    }

    /// Nearest noise slot strictly after `id`, skipping signal slots.
    pub fn nearest_valid_forward(&self, id: usize) -> Option<usize> {
        self.next_valid[id]
    }

    /// Finite circular replay of `count` window ids starting at `start`,
    /// walking in `direction`. The walk advances to the immediate neighbor
    /// only while that neighbor is a noise slot and wraps back to `start`
    /// otherwise.
    pub fn circular_replay(
        &self,
        start: usize,
        direction: ReplayDirection,
        count: usize,
    ) -> CircularReplay<'_> {
        CircularReplay {
            seq: self,
            start,
            current: start,
            direction,
            remaining: count,
        }
    }
}

/// Direction of a circular replay walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayDirection {
    /// Walk toward later windows (used when the gap precedes all noise).
    Forward,
    /// Walk toward earlier windows (the common case).
    Backward,
}

/// Two-state replay machine: it either advances along immediate noise
/// neighbors or has wrapped back to its starting slot, emitting exactly
/// `count` window ids in traversal order.
pub struct CircularReplay<'a> {
    seq: &'a WindowSequence,
    start: usize,
    current: usize,
    direction: ReplayDirection,
    remaining: usize,
}

impl Iterator for CircularReplay<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let emitted = self.current;

        let neighbor = match self.direction {
            ReplayDirection::Forward => {
                let next = self.current + 1;
                (next < self.seq.len() && self.seq.is_noise(next)).then_some(next)
            }
            ReplayDirection::Backward => self
                .current
                .checked_sub(1)
                .filter(|&prev| self.seq.is_noise(prev)),
        };
        self.current = neighbor.unwrap_or(self.start);

        Some(emitted)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(flags: &[bool]) -> WindowSequence {
        WindowSequence::new(flags.to_vec())
    }

    #[test]
    fn test_nearest_valid_neighbors_skip_gaps() {
        // ids:    0     1      2      3      4     5
        let s = seq(&[true, false, false, true, false, true]);
        assert_eq!(s.nearest_valid_backward(0), None);
        assert_eq!(s.nearest_valid_backward(2), Some(0));
        assert_eq!(s.nearest_valid_backward(4), Some(3));
        assert_eq!(s.nearest_valid_forward(0), Some(3));
        assert_eq!(s.nearest_valid_forward(1), Some(3));
        assert_eq!(s.nearest_valid_forward(5), None);
    }

    #[test]
    fn test_slot_count_matches_window_count() {
        let s = seq(&[true, false, true]);
        assert_eq!(s.len(), 3);
        assert!(!s.is_empty());
        assert!(seq(&[]).is_empty());
    }

    #[test]
    fn test_backward_replay_walks_contiguous_noise() {
        // noise run 0..=3, walk back from 3
        let s = seq(&[true, true, true, true, false]);
        let ids: Vec<usize> = s.circular_replay(3, ReplayDirection::Backward, 3).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_backward_replay_wraps_at_gap() {
        // only slots 2 and 3 are noise; walking back from 3 hits the gap at 1
        let s = seq(&[true, false, true, true, false]);
        let ids: Vec<usize> = s.circular_replay(3, ReplayDirection::Backward, 5).collect();
        assert_eq!(ids, vec![3, 2, 3, 2, 3]);
    }

    #[test]
    fn test_forward_replay_wraps_at_sequence_end() {
        let s = seq(&[false, false, true, true]);
        let ids: Vec<usize> = s.circular_replay(2, ReplayDirection::Forward, 5).collect();
        assert_eq!(ids, vec![2, 3, 2, 3, 2]);
    }

    #[test]
    fn test_replay_of_single_slot_repeats_it() {
        let s = seq(&[false, true, false]);
        let ids: Vec<usize> = s.circular_replay(1, ReplayDirection::Forward, 4).collect();
        assert_eq!(ids, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_replay_is_finite_and_restartable() {
        let s = seq(&[true, true]);
        let first: Vec<usize> = s.circular_replay(1, ReplayDirection::Backward, 3).collect();
        let second: Vec<usize> = s.circular_replay(1, ReplayDirection::Backward, 3).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
