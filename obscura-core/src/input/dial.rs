//! Detent tracking for the Seesaw hardware counters
//!
//! The Seesaw encoder module keeps a free-running i32 position counter.
//! `DialTracker` turns absolute counter reads into signed detent deltas,
//! surviving counter wraparound and sub-detent scaling.

/// Converts absolute hardware counter reads into detent deltas
#[derive(Debug, Clone)]
pub struct DialTracker {
    last_count: i32,
    counts_per_detent: i32,
    /// Sub-detent remainder carried between reads
    residual: i32,
}

impl DialTracker {
    /// Create a tracker seeded with the current counter value
    ///
    /// `counts_per_detent` must be positive; anything else is treated
    /// as 1.
    pub fn new(initial_count: i32, counts_per_detent: i32) -> Self {
        Self {
            last_count: initial_count,
            counts_per_detent: counts_per_detent.max(1),
            residual: 0,
        }
    }

    /// Feed an absolute counter read, returning whole detents moved
    ///
    /// Wrapping subtraction keeps the delta correct across the i32
    /// counter boundary.
    pub fn update(&mut self, count: i32) -> i32 {
        let delta = count.wrapping_sub(self.last_count);
        self.last_count = count;

        let total = self.residual + delta;
        let detents = total / self.counts_per_detent;
        self.residual = total % self.counts_per_detent;
        detents
    }

    /// Drop accumulated sub-detent movement, keeping the counter ref
    ///
    /// Called when the machine changes state so stored partial motion
    /// does not leak into the next screen.
    pub fn flush(&mut self) {
        self.residual = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_and_backward_deltas() {
        let mut dial = DialTracker::new(100, 1);
        assert_eq!(dial.update(103), 3);
        assert_eq!(dial.update(101), -2);
        assert_eq!(dial.update(101), 0);
    }

    #[test]
    fn survives_counter_wraparound() {
        let mut dial = DialTracker::new(i32::MAX - 1, 1);
        assert_eq!(dial.update(i32::MAX), 1);
        // One more count wraps to i32::MIN
        assert_eq!(dial.update(i32::MIN), 1);
        assert_eq!(dial.update(i32::MIN + 2), 2);
    }

    #[test]
    fn scaled_detents_accumulate_residual() {
        let mut dial = DialTracker::new(0, 4);
        assert_eq!(dial.update(3), 0);
        assert_eq!(dial.update(4), 1);
        assert_eq!(dial.update(11), 1);
        assert_eq!(dial.update(12), 1);
    }

    #[test]
    fn negative_scaled_movement() {
        let mut dial = DialTracker::new(0, 4);
        assert_eq!(dial.update(-3), 0);
        assert_eq!(dial.update(-4), -1);
        assert_eq!(dial.update(-8), -1);
    }

    #[test]
    fn flush_discards_partial_motion() {
        let mut dial = DialTracker::new(0, 4);
        assert_eq!(dial.update(3), 0);
        dial.flush();
        assert_eq!(dial.update(4), 0);
        assert_eq!(dial.update(8), 1);
    }

    #[test]
    fn zero_scale_treated_as_one() {
        let mut dial = DialTracker::new(0, 0);
        assert_eq!(dial.update(5), 5);
    }
}
