#![forbid(unsafe_code)]

//! Candidate normalization: deduplicate collected message nodes and order
//! them by document position.
//!
//! The collector itself lives host-side (it runs the site adapter's query
//! tiers against the live document). What it hands over is an arbitrary
//! candidate sequence that may contain the same node more than once when
//! overlapping selectors both match it. Normalization reduces that to the
//! engine's canonical view: each node once, in document order.
//!
//! Node identity and document position are host concepts, so both are passed
//! in as closures. Document order is a strict total order over distinct
//! nodes, which is why a plain sort suffices and ties cannot occur.

use std::cmp::Ordering;

/// Deduplicate `candidates` by identity and sort the survivors by document
/// position.
///
/// `same` decides whether two candidates reference the same underlying node
/// (first occurrence wins). `by_position` compares document positions.
///
/// Candidate sets are small (tens to low hundreds of conversation turns), so
/// the quadratic identity scan is deliberate: it avoids demanding `Hash` of
/// host node handles.
#[must_use]
pub fn normalize_candidates<N, S, C>(candidates: Vec<N>, mut same: S, mut by_position: C) -> Vec<N>
where
    S: FnMut(&N, &N) -> bool,
    C: FnMut(&N, &N) -> Ordering,
{
    let mut unique: Vec<N> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.iter().any(|kept| same(kept, &candidate)) {
            unique.push(candidate);
        }
    }
    unique.sort_by(|a, b| by_position(a, b));
    unique
}

#[cfg(test)]
mod tests {
    use super::normalize_candidates;

    fn normalize(values: Vec<u32>) -> Vec<u32> {
        normalize_candidates(values, |a, b| a == b, |a, b| a.cmp(b))
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        assert_eq!(normalize(vec![3, 1, 3, 2, 1]), vec![1, 2, 3]);
    }

    #[test]
    fn already_normal_input_is_unchanged() {
        assert_eq!(normalize(vec![1, 2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize(Vec::new()), Vec::<u32>::new());
    }

    #[test]
    fn identity_is_caller_defined_not_equality() {
        // Identity on the first tuple field only; the first occurrence's
        // payload survives.
        let candidates = vec![(1u32, "a"), (2, "b"), (1, "c")];
        let kept = normalize_candidates(candidates, |x, y| x.0 == y.0, |x, y| x.0.cmp(&y.0));
        assert_eq!(kept, vec![(1, "a"), (2, "b")]);
    }

    mod properties {
        use proptest::prelude::*;

        use super::normalize;

        proptest! {
            #[test]
            fn output_has_no_duplicates_and_strictly_increases(values in proptest::collection::vec(0u32..64, 0..48)) {
                let normalized = normalize(values);
                for window in normalized.windows(2) {
                    prop_assert!(window[0] < window[1]);
                }
            }

            #[test]
            fn output_preserves_the_input_value_set(values in proptest::collection::vec(0u32..64, 0..48)) {
                let normalized = normalize(values.clone());
                for value in &values {
                    prop_assert!(normalized.contains(value));
                }
                for value in &normalized {
                    prop_assert!(values.contains(value));
                }
            }
        }
    }
}
