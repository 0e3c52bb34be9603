//! Success rate and response tallies
//!
//! Features:
//! - Success rate against the expected number of matches
//! - Per-modality hit / false alarm / miss counts

use super::sequence::MATCH_PERCENT;

/// Matches a single stream of `number_of_events` is expected to carry
pub fn expected_matches(number_of_events: u32) -> u32 {
    number_of_events * MATCH_PERCENT / 100
}

/// Success rate in percent, truncated toward zero.
///
/// `modalities` multiplies the expected match count for multi-stream games.
/// A zero score or a zero expectation rates as 0.
pub fn success_rate(score: i32, number_of_events: u32, modalities: usize) -> i32 {
    let expected = expected_matches(number_of_events) as usize * modalities;
    if score == 0 || expected == 0 {
        return 0;
    }
    (score as f64 / expected as f64 * 100.0) as i32
}

/// Response outcomes for one modality
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResponseTally {
    /// Responded on a true match
    pub hits: u32,
    /// Responded on a non-match
    pub false_alarms: u32,
    /// True match closed without a response
    pub misses: u32,
}

impl ResponseTally {
    pub fn record_response(&mut self, correct: bool) {
        if correct {
            self.hits += 1;
        } else {
            self.false_alarms += 1;
        }
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Hits over all true matches seen (1.0 when none were seen)
    pub fn hit_ratio(&self) -> f32 {
        let matches = self.hits + self.misses;
        if matches == 0 {
            1.0
        } else {
            self.hits as f32 / matches as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_matches_expected_share() {
        // 10 events -> 3 expected matches
        assert_eq!(success_rate(3, 10, 1), 100);
        assert_eq!(success_rate(2, 10, 1), 66);
        assert_eq!(success_rate(-1, 10, 1), -33);
        assert_eq!(success_rate(0, 10, 1), 0);
    }

    #[test]
    fn test_success_rate_scales_with_modalities() {
        assert_eq!(success_rate(3, 10, 2), 50);
    }

    #[test]
    fn test_success_rate_without_expected_matches() {
        assert_eq!(expected_matches(3), 0);
        assert_eq!(success_rate(2, 3, 1), 0);
    }

    #[test]
    fn test_tally_hit_ratio() {
        let mut tally = ResponseTally::default();
        assert_eq!(tally.hit_ratio(), 1.0);
        tally.record_response(true);
        tally.record_response(false);
        tally.record_miss();
        assert_eq!(tally.hits, 1);
        assert_eq!(tally.false_alarms, 1);
        assert_eq!(tally.hit_ratio(), 0.5);
    }
}
