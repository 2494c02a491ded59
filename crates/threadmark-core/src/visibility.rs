#![forbid(unsafe_code)]

//! On-screen visibility tracking and active-entry selection.
//!
//! The host's intersection observer reports which message nodes currently
//! overlap the (margin-biased) viewport. [`VisibilityMap`] mirrors that set
//! as identifier → last-known bounding rectangle; [`VisibilityMap::active_entry`]
//! picks the message the reader is most plausibly looking at.
//!
//! Selection rule: among visible entries, the smallest non-negative top
//! offset wins (closest to, but not above, the viewport top). When every
//! visible entry is above the top edge, the visually topmost one wins. An
//! empty map selects nothing; no active entry is ever forced.

use std::collections::BTreeMap;

/// Bounding rectangle of a message node, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// One intersection-callback edge for a tracked message.
#[derive(Debug, Clone, PartialEq)]
pub enum VisibilityTransition {
    /// The message began intersecting the biased viewport.
    Entered { id: String, rect: Rect },
    /// The message stopped intersecting.
    Exited { id: String },
}

/// Ephemeral identifier → rectangle map of currently-intersecting messages.
///
/// Keyed by a `BTreeMap` so iteration (and therefore tie-breaking between
/// equal top offsets) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct VisibilityMap {
    entries: BTreeMap<String, Rect>,
}

impl VisibilityMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a batch of enter/exit transitions from one observer callback.
    pub fn apply(&mut self, transitions: impl IntoIterator<Item = VisibilityTransition>) {
        for transition in transitions {
            match transition {
                VisibilityTransition::Entered { id, rect } => {
                    self.entries.insert(id, rect);
                }
                VisibilityTransition::Exited { id } => {
                    self.entries.remove(&id);
                }
            }
        }
    }

    /// Drop every tracked entry (the observer is being re-subscribed).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Identifier of the entry to highlight, per the selection rule above.
    #[must_use]
    pub fn active_entry(&self) -> Option<&str> {
        let mut best_at_or_below_top: Option<(&str, f64)> = None;
        let mut topmost: Option<(&str, f64)> = None;

        for (id, rect) in &self.entries {
            if topmost.is_none_or(|(_, top)| rect.top < top) {
                topmost = Some((id.as_str(), rect.top));
            }
            if rect.top >= 0.0
                && best_at_or_below_top.is_none_or(|(_, top)| rect.top < top)
            {
                best_at_or_below_top = Some((id.as_str(), rect.top));
            }
        }

        best_at_or_below_top.or(topmost).map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Rect, VisibilityMap, VisibilityTransition};

    fn at_top(top: f64) -> Rect {
        Rect {
            top,
            left: 0.0,
            width: 600.0,
            height: 120.0,
        }
    }

    fn entered(id: &str, top: f64) -> VisibilityTransition {
        VisibilityTransition::Entered {
            id: id.to_owned(),
            rect: at_top(top),
        }
    }

    fn exited(id: &str) -> VisibilityTransition {
        VisibilityTransition::Exited { id: id.to_owned() }
    }

    #[test]
    fn empty_map_selects_nothing() {
        let map = VisibilityMap::new();
        assert!(map.is_empty());
        assert_eq!(map.active_entry(), None);
    }

    #[test]
    fn smallest_non_negative_top_wins() {
        let mut map = VisibilityMap::new();
        map.apply([entered("a", 320.0), entered("b", 48.0), entered("c", -15.0)]);
        assert_eq!(map.active_entry(), Some("b"));
    }

    #[test]
    fn all_above_viewport_top_falls_back_to_topmost() {
        let mut map = VisibilityMap::new();
        map.apply([entered("a", -300.0), entered("b", -80.0)]);
        assert_eq!(map.active_entry(), Some("a"));
    }

    #[test]
    fn zero_top_counts_as_non_negative() {
        let mut map = VisibilityMap::new();
        map.apply([entered("a", 0.0), entered("b", 12.0)]);
        assert_eq!(map.active_entry(), Some("a"));
    }

    #[test]
    fn exit_removes_the_entry_and_reselects() {
        let mut map = VisibilityMap::new();
        map.apply([entered("a", 10.0), entered("b", 200.0)]);
        assert_eq!(map.active_entry(), Some("a"));

        map.apply([exited("a")]);
        assert_eq!(map.active_entry(), Some("b"));

        map.apply([exited("b")]);
        assert_eq!(map.active_entry(), None);
    }

    #[test]
    fn re_entry_updates_the_stored_rectangle() {
        let mut map = VisibilityMap::new();
        map.apply([entered("a", 500.0), entered("b", 40.0)]);
        assert_eq!(map.active_entry(), Some("b"));

        // "a" scrolled up past "b".
        map.apply([entered("a", 8.0)]);
        assert_eq!(map.active_entry(), Some("a"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn selection_only_ever_names_a_tracked_identifier() {
        let mut map = VisibilityMap::new();
        map.apply([entered("a", -10.0), entered("b", 64.0), exited("a")]);
        let active = map.active_entry().expect("one entry should be visible");
        assert!(map.contains(active));
    }

    #[test]
    fn clear_resets_tracking_between_subscriptions() {
        let mut map = VisibilityMap::new();
        map.apply([entered("a", 10.0)]);
        map.clear();
        assert_eq!(map.active_entry(), None);
    }
}
