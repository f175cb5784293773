//! Enumeration of the ways a clue can split into laser run lengths.
//!
//! A clue `v` is the product of the lengths of the straight segments of its
//! laser path. Segments of length 1 only ever occur at the ends of a path
//! (mirrors are never adjacent), so the interesting segments are the factors
//! of `v` that are at least 2 and at most one more than the grid size (a
//! corridor from one clue cell straight across to the opposite one).

use std::fmt;

use crate::grid::Number;

/// `base` repeated `count` times.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Factor {
    pub base: Number,
    pub count: u32,
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}^{}", self.base, self.count)
    }
}

/// Every factorization of one value into bases in `[2, cutoff]`.
///
/// Each candidate is a list of `Factor` runs ascending by base. Candidates
/// are kept in generation order, which is lexicographic on the expanded
/// factor sequence (`2*2*9` before `2*3*6` before `4*9`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Factorizations {
    value: Number,
    candidates: Vec<Vec<Factor>>,
}

impl Factorizations {
    /// Enumerates the factorizations of `value` with every base at most
    /// `cutoff`. Values below 2 have the single candidate `1^1`.
    pub fn new(value: Number, cutoff: Number) -> Self {
        if value < 2 {
            return Self {
                value,
                candidates: vec![vec![Factor { base: 1, count: 1 }]],
            };
        }

        let mut candidates = Vec::new();
        let mut current = Vec::new();
        collect(value, 2, cutoff, &mut current, &mut candidates);

        Self { value, candidates }
    }

    pub fn value(&self) -> Number {
        self.value
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[Vec<Factor>] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec<Factor>> {
        self.candidates.iter()
    }
}

impl<'a> IntoIterator for &'a Factorizations {
    type Item = &'a Vec<Factor>;
    type IntoIter = std::slice::Iter<'a, Vec<Factor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Number of run lengths in a candidate, counting repeats.
pub fn total_factors(factors: &[Factor]) -> usize {
    factors.iter().map(|f| f.count as usize).sum()
}

/// Depth-first search over non-decreasing factor sequences.
///
/// `current` holds the factors chosen so far; every factor pushed from here
/// on is at least `start`.
fn collect(
    remaining: Number,
    start: Number,
    cutoff: Number,
    current: &mut Vec<Number>,
    out: &mut Vec<Vec<Factor>>,
) {
    if start > cutoff {
        return;
    }

    if remaining < 2 {
        out.push(group_runs(current));
        return;
    }

    let mut divisor = start;
    while divisor <= cutoff && divisor.checked_mul(divisor).is_some_and(|sq| sq <= remaining) {
        if remaining % divisor == 0 {
            current.push(divisor);
            collect(remaining / divisor, divisor, cutoff, current, out);
            current.pop();
        }
        divisor += 1;
    }

    // the remainder itself as the last (largest) factor
    if remaining >= start {
        current.push(remaining);
        collect(1, remaining, cutoff, current, out);
        current.pop();
    }
}

/// Turns a sorted factor sequence into `(base, count)` runs.
fn group_runs(sequence: &[Number]) -> Vec<Factor> {
    let mut runs: Vec<Factor> = Vec::new();
    for &base in sequence {
        match runs.last_mut() {
            Some(run) if run.base == base => run.count += 1,
            _ => runs.push(Factor { base, count: 1 }),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn expand(factors: &[Factor]) -> Vec<Number> {
        factors
            .iter()
            .flat_map(|f| std::iter::repeat(f.base).take(f.count as usize))
            .collect()
    }

    /// Every non-decreasing sequence over `[2, cutoff]` with product `value`.
    fn brute_force(value: Number, cutoff: Number) -> Vec<Vec<Number>> {
        fn extend(
            remaining: Number,
            min: Number,
            cutoff: Number,
            current: &mut Vec<Number>,
            out: &mut Vec<Vec<Number>>,
        ) {
            if remaining == 1 {
                out.push(current.clone());
                return;
            }
            for base in min..=cutoff.min(remaining) {
                if remaining % base == 0 {
                    current.push(base);
                    extend(remaining / base, base, cutoff, current, out);
                    current.pop();
                }
            }
        }

        let mut out = Vec::new();
        extend(value, 2, cutoff, &mut Vec::new(), &mut out);
        out
    }

    #[test]
    fn test_small_values() {
        let twelve = Factorizations::new(12, 5);
        assert_eq!(
            twelve.candidates(),
            &[
                vec![Factor { base: 2, count: 2 }, Factor { base: 3, count: 1 }],
                vec![Factor { base: 3, count: 1 }, Factor { base: 4, count: 1 }],
            ]
        );

        let thirty_six = Factorizations::new(36, 5);
        let expanded: Vec<_> = thirty_six.iter().map(|c| expand(c)).collect();
        assert_eq!(expanded, vec![vec![2, 2, 3, 3], vec![3, 3, 4]]);
    }

    #[test]
    fn test_values_below_two() {
        for value in [0, 1] {
            let factorizations = Factorizations::new(value, 5);
            assert_eq!(factorizations.len(), 1);
            assert_eq!(factorizations.candidates()[0], vec![Factor { base: 1, count: 1 }]);
        }
    }

    #[test]
    fn test_prime_above_cutoff_has_no_candidates() {
        assert!(Factorizations::new(7, 5).is_empty());
        assert!(Factorizations::new(75, 4).is_empty(), "75 = 3 * 5 * 5 needs 5");
        assert_eq!(Factorizations::new(75, 5).len(), 1);
    }

    #[test]
    fn test_large_values_stop_at_cutoff() {
        // 2^64 - 1 = 3 * 5 * 17 * 257 * 641 * 65537 * 6700417
        assert!(Factorizations::new(Number::MAX, 10).is_empty());
        assert!(Factorizations::new(1_000_000_000_000_000_003, 10).is_empty());

        let power = Factorizations::new(1 << 63, 2);
        assert_eq!(power.candidates(), &[vec![Factor { base: 2, count: 63 }]]);
    }

    #[test]
    fn test_total_factors_counts_repeats() {
        let factorizations = Factorizations::new(16, 5);
        let totals: Vec<_> = factorizations.iter().map(|c| total_factors(c)).collect();
        // 2*2*2*2, 2*2*4, 4*4
        assert_eq!(totals, vec![4, 3, 2]);
    }

    #[test]
    fn test_factor_display() {
        assert_eq!(Factor { base: 3, count: 2 }.to_string(), "3^2");
    }

    proptest! {
        #[test]
        fn test_matches_brute_force(value in 2u64..600, cutoff in 1u64..12) {
            let factorizations = Factorizations::new(value, cutoff);
            let found: Vec<Vec<Number>> = factorizations.iter().map(|c| expand(c)).collect();
            let expected = brute_force(value, cutoff);

            prop_assert_eq!(&found, &expected);
            prop_assert_eq!(factorizations.value(), value);
        }

        #[test]
        fn test_candidates_are_valid_and_ordered(value in 2u64..2000, cutoff in 2u64..12) {
            let factorizations = Factorizations::new(value, cutoff);
            let expanded: Vec<Vec<Number>> = factorizations.iter().map(|c| expand(c)).collect();

            for (candidate, sequence) in factorizations.iter().zip(&expanded) {
                prop_assert_eq!(sequence.iter().product::<Number>(), value);
                prop_assert!(sequence.iter().all(|&b| (2..=cutoff).contains(&b)));
                prop_assert!(candidate.windows(2).all(|w| w[0].base < w[1].base));
            }
            prop_assert!(expanded.windows(2).all(|w| w[0] < w[1]), "strictly ascending, no duplicates");
        }
    }
}
