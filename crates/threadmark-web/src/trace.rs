#![forbid(unsafe_code)]

//! JSONL trace export for engine diagnostics.
//!
//! The engine records every transition in its bounded diagnostics queue; the
//! content script drains that queue after each pass, stamps the records with
//! elapsed time, and keeps a bounded ring the host can export as JSONL (one
//! object per line) for bug reports against a live page.

use std::collections::VecDeque;

use serde::Serialize;
use threadmark_core::{SyncDiagnostic, SyncEvent};

const MAX_TRACE_RECORDS: usize = 512;

/// One exported trace line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    /// Engine-assigned emission sequence number.
    pub seq: u64,
    /// Milliseconds since the engine booted.
    pub elapsed_ms: u64,
    /// Stable event name.
    pub event: &'static str,
    /// Message count, for events that carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Debounce generation, for events that carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
}

impl TraceRecord {
    /// Flatten an engine diagnostic into an exportable record.
    #[must_use]
    pub fn from_diagnostic(diagnostic: &SyncDiagnostic, elapsed_ms: u64) -> Self {
        let (count, generation) = match &diagnostic.event {
            SyncEvent::ResyncScheduled { generation }
            | SyncEvent::DebounceSuperseded { generation } => (None, Some(*generation)),
            SyncEvent::PassUnchanged { count } | SyncEvent::PanelRebuilt { count } => {
                (Some(*count), None)
            }
            SyncEvent::PassStarted
            | SyncEvent::PassDropped
            | SyncEvent::PanelCleared
            | SyncEvent::LocationReset => (None, None),
        };
        Self {
            seq: diagnostic.seq,
            elapsed_ms,
            event: diagnostic.event.kind(),
            count,
            generation,
        }
    }
}

/// Bounded ring of trace records.
#[derive(Debug, Default)]
pub struct TraceBuffer {
    records: VecDeque<TraceRecord>,
}

impl TraceBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append drained diagnostics, evicting the oldest records past the cap.
    pub fn absorb(&mut self, diagnostics: &[SyncDiagnostic], elapsed_ms: u64) {
        for diagnostic in diagnostics {
            if self.records.len() >= MAX_TRACE_RECORDS {
                self.records.pop_front();
            }
            self.records
                .push_back(TraceRecord::from_diagnostic(diagnostic, elapsed_ms));
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render the ring as JSONL, oldest record first.
    #[must_use]
    pub fn jsonl(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            match serde_json::to_string(record) {
                Ok(line) => {
                    out.push_str(&line);
                    out.push('\n');
                }
                // A record that cannot serialize is dropped from the export;
                // the ring itself is unaffected.
                Err(_) => continue,
            }
        }
        out
    }
}
