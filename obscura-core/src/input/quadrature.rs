//! Quadrature decoder state machine
//!
//! Decodes raw A/B contact levels into signed detents. The installation
//! normally reads detents from the Seesaw hardware counter, but the
//! service panel dial is wired straight to GPIO and goes through this
//! decoder.
//!
//! A detent on the fitted dials is one full Gray-code cycle
//! (four edges). Tracking the cycle explicitly rejects contact bounce:
//! a bounce retraces the last edge and cancels itself out, and an
//! illegal two-bit jump resynchronises without emitting anything.

/// Decoder state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    CwStep1,
    CwStep2,
    CwStep3,
    CcwStep1,
    CcwStep2,
    CcwStep3,
}

/// 4-state Gray-code quadrature decoder
///
/// Feed it sampled A/B levels; it returns `+1`/`-1` when a full detent
/// completes, `0` otherwise.
#[derive(Debug, Clone)]
pub struct QuadratureDecoder {
    phase: Phase,
    last_a: bool,
    last_b: bool,
}

impl QuadratureDecoder {
    /// Create a decoder, seeded with the current contact levels
    ///
    /// Detent rest position is (1,1).
    pub fn new(a: bool, b: bool) -> Self {
        Self {
            phase: Phase::Idle,
            last_a: a,
            last_b: b,
        }
    }

    /// Feed one sample of the A/B contacts
    ///
    /// Call at a rate fast enough to see every edge (1-5 ms).
    pub fn update(&mut self, a: bool, b: bool) -> i8 {
        // No change
        if a == self.last_a && b == self.last_b {
            return 0;
        }

        let detent = self.step(a, b);

        self.last_a = a;
        self.last_b = b;

        detent
    }

    /// Advance the state machine by one edge
    ///
    /// CW cycle:  (1,1) -> (0,1) -> (0,0) -> (1,0) -> (1,1) = +1
    /// CCW cycle: (1,1) -> (1,0) -> (0,0) -> (0,1) -> (1,1) = -1
    ///
    /// A retraced edge steps the machine back (bounce); any other
    /// off-sequence pair resynchronises to Idle with no output.
    fn step(&mut self, a: bool, b: bool) -> i8 {
        let next = match (self.phase, a, b) {
            // Clockwise sequence
            (Phase::Idle, false, true) => Phase::CwStep1,
            (Phase::CwStep1, false, false) => Phase::CwStep2,
            (Phase::CwStep2, true, false) => Phase::CwStep3,
            (Phase::CwStep3, true, true) => {
                self.phase = Phase::Idle;
                return 1;
            }
            // Counter-clockwise sequence
            (Phase::Idle, true, false) => Phase::CcwStep1,
            (Phase::CcwStep1, false, false) => Phase::CcwStep2,
            (Phase::CcwStep2, false, true) => Phase::CcwStep3,
            (Phase::CcwStep3, true, true) => {
                self.phase = Phase::Idle;
                return -1;
            }
            // Bounce: one edge retraced
            (Phase::CwStep1, true, true) => Phase::Idle,
            (Phase::CwStep2, false, true) => Phase::CwStep1,
            (Phase::CwStep3, false, false) => Phase::CwStep2,
            (Phase::CcwStep1, true, true) => Phase::Idle,
            (Phase::CcwStep2, true, false) => Phase::CcwStep1,
            (Phase::CcwStep3, false, false) => Phase::CcwStep2,
            // Illegal jump, resynchronise
            _ => Phase::Idle,
        };
        self.phase = next;
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run a sequence of (a, b) samples and sum the detents
    fn run(decoder: &mut QuadratureDecoder, samples: &[(bool, bool)]) -> i32 {
        samples
            .iter()
            .map(|&(a, b)| i32::from(decoder.update(a, b)))
            .sum()
    }

    const CW_CYCLE: [(bool, bool); 4] =
        [(false, true), (false, false), (true, false), (true, true)];
    const CCW_CYCLE: [(bool, bool); 4] =
        [(true, false), (false, false), (false, true), (true, true)];

    #[test]
    fn full_cw_cycle_is_one_detent() {
        let mut decoder = QuadratureDecoder::new(true, true);
        assert_eq!(run(&mut decoder, &CW_CYCLE), 1);
    }

    #[test]
    fn full_ccw_cycle_is_minus_one_detent() {
        let mut decoder = QuadratureDecoder::new(true, true);
        assert_eq!(run(&mut decoder, &CCW_CYCLE), -1);
    }

    #[test]
    fn detent_fires_only_at_cycle_end() {
        let mut decoder = QuadratureDecoder::new(true, true);
        assert_eq!(decoder.update(false, true), 0);
        assert_eq!(decoder.update(false, false), 0);
        assert_eq!(decoder.update(true, false), 0);
        assert_eq!(decoder.update(true, true), 1);
    }

    #[test]
    fn bounce_on_first_edge_cancels() {
        let mut decoder = QuadratureDecoder::new(true, true);
        // A falls, bounces back, then the real cycle happens
        assert_eq!(decoder.update(false, true), 0);
        assert_eq!(decoder.update(true, true), 0);
        assert_eq!(run(&mut decoder, &CW_CYCLE), 1);
    }

    #[test]
    fn bounce_mid_cycle_does_not_double_count() {
        let mut decoder = QuadratureDecoder::new(true, true);
        let samples = [
            (false, true),
            (false, false),
            (false, true), // retrace
            (false, false),
            (true, false),
            (true, true),
        ];
        assert_eq!(run(&mut decoder, &samples), 1);
    }

    #[test]
    fn illegal_jump_resynchronises() {
        let mut decoder = QuadratureDecoder::new(true, true);
        // Two-bit jump mid-cycle: discard, no detent
        assert_eq!(decoder.update(false, true), 0);
        assert_eq!(decoder.update(true, false), 0);
        // A clean cycle afterwards still counts
        assert_eq!(run(&mut decoder, &CW_CYCLE), 1);
    }

    #[test]
    fn direction_reversal_mid_cycle_yields_nothing() {
        let mut decoder = QuadratureDecoder::new(true, true);
        let samples = [
            (false, true),
            (false, false),
            (false, true),
            (true, true), // backed all the way out
        ];
        assert_eq!(run(&mut decoder, &samples), 0);
    }

    #[test]
    fn repeated_samples_are_ignored() {
        let mut decoder = QuadratureDecoder::new(true, true);
        assert_eq!(decoder.update(true, true), 0);
        assert_eq!(decoder.update(false, true), 0);
        assert_eq!(decoder.update(false, true), 0);
        assert_eq!(decoder.update(false, false), 0);
        assert_eq!(decoder.update(true, false), 0);
        assert_eq!(decoder.update(true, true), 1);
    }

    #[test]
    fn many_cycles_accumulate_exactly() {
        let mut decoder = QuadratureDecoder::new(true, true);
        let mut total = 0;
        for _ in 0..10 {
            total += run(&mut decoder, &CW_CYCLE);
        }
        for _ in 0..4 {
            total += run(&mut decoder, &CCW_CYCLE);
        }
        assert_eq!(total, 6);
    }

    proptest::proptest! {
        /// Arbitrary contact chatter can only ever emit a detent at the
        /// rest position, one at a time
        #[test]
        fn detents_only_complete_at_rest(samples in proptest::collection::vec(
            (proptest::bool::ANY, proptest::bool::ANY), 0..256)) {
            let mut decoder = QuadratureDecoder::new(true, true);
            for (a, b) in samples {
                let detent = decoder.update(a, b);
                proptest::prop_assert!((-1..=1).contains(&detent));
                if detent != 0 {
                    proptest::prop_assert!(a && b);
                }
            }
        }

        /// A bounce (edge retraced immediately) inserted into a clean
        /// cycle never changes the count
        #[test]
        fn single_bounce_is_invisible(at in 0usize..4) {
            let mut decoder = QuadratureDecoder::new(true, true);
            let mut total = 0i32;
            for (i, &(a, b)) in CW_CYCLE.iter().enumerate() {
                total += i32::from(decoder.update(a, b));
                if i == at {
                    // retrace and redo this edge
                    let (pa, pb) = if i == 0 { (true, true) } else { CW_CYCLE[i - 1] };
                    total += i32::from(decoder.update(pa, pb));
                    total += i32::from(decoder.update(a, b));
                }
            }
            proptest::prop_assert_eq!(total, 1);
        }
    }
}
