#![forbid(unsafe_code)]

//! Engine tuning knobs.

use core::time::Duration;

/// Intersection-observer tuning.
///
/// The root margin biases "active" selection toward the upper-middle of the
/// viewport: the observed area is shrunk 10% at the top and 40% at the
/// bottom, so a message counts as visible while it sits in the reading band
/// rather than anywhere it merely overlaps the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverTuning {
    /// Fraction of a message's area that must intersect before it counts as
    /// visible.
    pub threshold: f64,
    /// Top root-margin adjustment in percent (negative shrinks the band).
    pub top_margin_pct: i32,
    /// Bottom root-margin adjustment in percent (negative shrinks the band).
    pub bottom_margin_pct: i32,
}

impl Default for ObserverTuning {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            top_margin_pct: -10,
            bottom_margin_pct: -40,
        }
    }
}

impl ObserverTuning {
    /// CSS `rootMargin` string for the observer options.
    #[must_use]
    pub fn root_margin(&self) -> String {
        format!("{}% 0px {}% 0px", self.top_margin_pct, self.bottom_margin_pct)
    }
}

/// Tuning knobs for the synchronization engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Quiet window after the last structural mutation before a
    /// resynchronization runs. Each new mutation restarts the window.
    pub debounce_window: Duration,

    /// Period of the navigation-URL poll. Single-page-app route changes do
    /// not reliably surface as events to injected code, so the location is
    /// compared on this interval.
    pub location_poll_interval: Duration,

    /// Delay between detecting a navigation change and the forced
    /// resynchronization, giving the new route's DOM time to settle.
    pub navigation_settle_delay: Duration,

    /// Display-column budget for panel entry labels (0 = unclipped).
    pub max_label_width: usize,

    /// Intersection-observer tuning.
    pub observer: ObserverTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(500),
            location_poll_interval: Duration::from_secs(1),
            navigation_settle_delay: Duration::from_secs(1),
            max_label_width: 60,
            observer: ObserverTuning::default(),
        }
    }
}
