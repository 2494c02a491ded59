#![forbid(unsafe_code)]

//! The synchronization controller state machine.
//!
//! [`SyncEngine`] owns everything the original overlay kept in ambient
//! globals: the last-rendered identifier sequence, the debounce generation,
//! the re-entrancy flag, and the last-seen navigation URL. The host (the
//! wasm content script, or a test) drives it through explicit calls and owns
//! the real timers and frame callbacks; the engine only decides *whether*
//! each step may proceed.
//!
//! # Pass lifecycle
//!
//! ```text
//! mutation burst ─▶ schedule()*        (cancel-and-replace debounce)
//!                    │
//!                    ▼ timer fires
//!                  debounce_elapsed(token)   (stale tokens are no-ops)
//!                    │
//!                    ▼
//!                  begin_pass()        (re-entrancy gate, drops overlaps)
//!                    │
//!                    ▼ next animation frame: collect + assign identities
//!                  complete_pass(ids)  (diff, store, clear the gate)
//! ```
//!
//! Every transition is recorded in a bounded diagnostics queue the host can
//! drain for logging or trace export.

use std::collections::VecDeque;

use crate::diff::sequence_changed;

const MAX_DIAGNOSTICS: usize = 256;

/// Generation token handed out by [`SyncEngine::schedule`].
///
/// Only the most recently issued token fires; earlier ones are superseded by
/// the cancel-and-replace debounce policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceToken(u64);

/// What a completed resynchronization pass asks the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The identifier sequence is unchanged; leave the panel alone.
    Unchanged { count: usize },
    /// The sequence changed and is non-empty; rebuild the panel and
    /// re-subscribe visibility tracking.
    Render { count: usize },
    /// The sequence changed to empty; remove the panel entirely.
    Clear,
}

/// One diagnostics record, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncDiagnostic {
    pub seq: u64,
    pub event: SyncEvent,
}

/// Observable engine transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A resynchronization was scheduled under this debounce generation.
    ResyncScheduled { generation: u64 },
    /// A pending debounce generation was superseded before firing.
    DebounceSuperseded { generation: u64 },
    /// A pass started (the re-entrancy gate was free).
    PassStarted,
    /// A pass request arrived while one was in flight and was dropped.
    PassDropped,
    /// A pass completed without changes.
    PassUnchanged { count: usize },
    /// A pass completed and the panel was rebuilt.
    PanelRebuilt { count: usize },
    /// A pass completed with an empty message set; the panel was removed.
    PanelCleared,
    /// The polled navigation URL changed; the stored sequence was reset.
    LocationReset,
}

impl SyncEvent {
    /// Stable event name for logs and trace export.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ResyncScheduled { .. } => "resync_scheduled",
            Self::DebounceSuperseded { .. } => "debounce_superseded",
            Self::PassStarted => "pass_started",
            Self::PassDropped => "pass_dropped",
            Self::PassUnchanged { .. } => "pass_unchanged",
            Self::PanelRebuilt { .. } => "panel_rebuilt",
            Self::PanelCleared => "panel_cleared",
            Self::LocationReset => "location_reset",
        }
    }
}

/// Explicit state record for one document lifetime.
#[derive(Debug, Default)]
pub struct SyncEngine {
    rendered_ids: Vec<String>,
    refreshing: bool,
    last_url: Option<String>,
    debounce_generation: u64,
    debounce_armed: bool,
    diagnostics: VecDeque<SyncDiagnostic>,
    next_seq: u64,
}

impl SyncEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The identifier sequence the panel currently mirrors.
    #[must_use]
    pub fn rendered_ids(&self) -> &[String] {
        &self.rendered_ids
    }

    /// Whether a pass is currently in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Arm (or re-arm) the debounce. The returned token must be carried by
    /// the host's timer; re-arming supersedes any pending token.
    pub fn schedule(&mut self) -> DebounceToken {
        if self.debounce_armed {
            self.record(SyncEvent::DebounceSuperseded {
                generation: self.debounce_generation,
            });
        }
        self.debounce_generation += 1;
        self.debounce_armed = true;
        self.record(SyncEvent::ResyncScheduled {
            generation: self.debounce_generation,
        });
        DebounceToken(self.debounce_generation)
    }

    /// Report that the host timer carrying `token` fired. Returns `true`
    /// when the token is still current and a pass should begin; stale
    /// tokens (superseded by a later [`schedule`](Self::schedule)) are
    /// no-ops.
    pub fn debounce_elapsed(&mut self, token: DebounceToken) -> bool {
        if !self.debounce_armed || token.0 != self.debounce_generation {
            return false;
        }
        self.debounce_armed = false;
        true
    }

    /// Try to enter the resynchronization critical section. Returns `false`
    /// (and drops the request) when a pass is already in flight; the next
    /// mutation will naturally re-trigger it.
    pub fn begin_pass(&mut self) -> bool {
        if self.refreshing {
            self.record(SyncEvent::PassDropped);
            return false;
        }
        self.refreshing = true;
        self.record(SyncEvent::PassStarted);
        true
    }

    /// Complete the in-flight pass with the freshly collected identifier
    /// sequence. Stores the sequence on change and clears the re-entrancy
    /// flag unconditionally, including on the no-change path.
    pub fn complete_pass(&mut self, new_ids: Vec<String>) -> PassOutcome {
        let outcome = if !sequence_changed(&new_ids, &self.rendered_ids) {
            PassOutcome::Unchanged {
                count: new_ids.len(),
            }
        } else if new_ids.is_empty() {
            self.rendered_ids = new_ids;
            PassOutcome::Clear
        } else {
            let count = new_ids.len();
            self.rendered_ids = new_ids;
            PassOutcome::Render { count }
        };

        self.refreshing = false;
        self.record(match &outcome {
            PassOutcome::Unchanged { count } => SyncEvent::PassUnchanged { count: *count },
            PassOutcome::Render { count } => SyncEvent::PanelRebuilt { count: *count },
            PassOutcome::Clear => SyncEvent::PanelCleared,
        });
        outcome
    }

    /// Feed one navigation-poll sample. Returns `true` when the URL changed
    /// since the last sample: the stored identifier sequence is reset to
    /// empty (forcing a full re-render even under identifier collisions) and
    /// the host should schedule a settle-delayed pass. The first sample only
    /// establishes the baseline.
    pub fn observe_location(&mut self, url: &str) -> bool {
        match self.last_url.as_deref() {
            None => {
                self.last_url = Some(url.to_owned());
                false
            }
            Some(last) if last == url => false,
            Some(_) => {
                self.last_url = Some(url.to_owned());
                self.rendered_ids.clear();
                self.record(SyncEvent::LocationReset);
                true
            }
        }
    }

    /// Drain the diagnostics queue in emission order.
    pub fn drain_diagnostics(&mut self) -> Vec<SyncDiagnostic> {
        self.diagnostics.drain(..).collect()
    }

    fn record(&mut self, event: SyncEvent) {
        if self.diagnostics.len() >= MAX_DIAGNOSTICS {
            self.diagnostics.pop_front();
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.diagnostics.push_back(SyncDiagnostic { seq, event });
    }
}
