//! N-back stimulus sequence generation
//!
//! Produces a sequence of 1-based stimulus values where a fixed share of
//! the eligible positions repeat the value `n_back` steps earlier and all
//! other eligible positions are guaranteed not to.

use rand::seq::index;
use rand::Rng;

/// Share of events (percent) that are true matches
pub const MATCH_PERCENT: u32 = 30;

/// Number of true matches a sequence of `length` carries
pub fn match_count(length: u32, match_percent: u32, n_back: u32) -> u32 {
    let eligible = length.saturating_sub(n_back);
    (length * match_percent / 100).min(eligible)
}

/// Generate `length` values in `1..=combinations`
pub fn generate<R: Rng + ?Sized>(
    length: u32,
    combinations: u32,
    match_percent: u32,
    n_back: u32,
    rng: &mut R,
) -> Vec<u32> {
    let length = length as usize;
    let n = n_back as usize;
    let combinations = combinations.max(1);
    let mut sequence = Vec::with_capacity(length);

    let mut is_match = vec![false; length];
    let eligible = length.saturating_sub(n);
    let matches = match_count(length as u32, match_percent, n_back) as usize;
    if n > 0 && matches > 0 {
        for offset in index::sample(rng, eligible, matches) {
            is_match[n + offset] = true;
        }
    }

    for i in 0..length {
        let value = if n > 0 && i >= n {
            let back = sequence[i - n];
            if is_match[i] {
                back
            } else {
                different_value(back, combinations, rng)
            }
        } else {
            rng.gen_range(1..=combinations)
        };
        sequence.push(value);
    }

    sequence
}

/// Uniform value in `1..=combinations` other than `avoid`
fn different_value<R: Rng + ?Sized>(avoid: u32, combinations: u32, rng: &mut R) -> u32 {
    if combinations < 2 {
        return avoid;
    }
    let pick = rng.gen_range(1..combinations);
    if pick >= avoid {
        pick + 1
    } else {
        pick
    }
}

/// Positions `i` where `sequence[i] == sequence[i - n_back]`
pub fn match_positions(sequence: &[u32], n_back: u32) -> Vec<usize> {
    let n = n_back as usize;
    if n == 0 {
        return Vec::new();
    }
    (n..sequence.len())
        .filter(|&i| sequence[i] == sequence[i - n])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let seq = generate(100, 9, MATCH_PERCENT, 2, &mut rng);
        assert_eq!(seq.len(), 100);
        assert!(seq.iter().all(|&v| (1..=9).contains(&v)));
    }

    #[test]
    fn test_exact_match_count() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let seq = generate(10, 9, MATCH_PERCENT, 1, &mut rng);
            assert_eq!(match_positions(&seq, 1).len(), 3, "seed {seed}");
        }
    }

    #[test]
    fn test_match_count_capped_by_eligible_positions() {
        assert_eq!(match_count(10, 30, 9), 1);
        assert_eq!(match_count(3, 30, 1), 0);
        assert_eq!(match_count(5, 30, 5), 0);

        let mut rng = StdRng::seed_from_u64(3);
        let seq = generate(10, 4, 30, 9, &mut rng);
        assert_eq!(match_positions(&seq, 9).len(), 1);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = generate(20, 16, MATCH_PERCENT, 2, &mut StdRng::seed_from_u64(42));
        let b = generate(20, 16, MATCH_PERCENT, 2, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_value_never_returns_avoided() {
        let mut rng = StdRng::seed_from_u64(11);
        for avoid in 1..=4 {
            for _ in 0..50 {
                let v = different_value(avoid, 4, &mut rng);
                assert_ne!(v, avoid);
                assert!((1..=4).contains(&v));
            }
        }
    }
}
