#![forbid(unsafe_code)]

//! Sequence-equality change detection.
//!
//! A resynchronization pass re-renders the panel only when the freshly
//! collected identifier sequence differs from the one the panel currently
//! mirrors. This is a cheap positional comparison, not a structural diff:
//! any difference triggers a full rebuild downstream, which is acceptable at
//! conversation scale.

/// Whether `new_ids` warrants a re-render given the previously rendered
/// `old_ids`: true iff the lengths differ or any position differs.
#[must_use]
pub fn sequence_changed(new_ids: &[String], old_ids: &[String]) -> bool {
    new_ids.len() != old_ids.len()
        || new_ids
            .iter()
            .zip(old_ids.iter())
            .any(|(new_id, old_id)| new_id != old_id)
}
