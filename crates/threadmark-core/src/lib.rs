#![forbid(unsafe_code)]

//! Host-agnostic synchronization engine for the Threadmark navigation overlay.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding surface (a content script, a test
//!   harness) performs every DOM query and mutation and feeds the results in.
//! - **Deterministic time**: debounce and re-entrancy are modeled as explicit
//!   state transitions; the host owns the actual timers and frame callbacks.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! This crate intentionally does not bind to `wasm-bindgen`. The browser glue
//! lives in `threadmark-web`, which wraps these building blocks with the
//! observer and panel plumbing.

pub mod collect;
pub mod config;
pub mod diff;
pub mod engine;
pub mod identity;
pub mod label;
pub mod visibility;

pub use config::{EngineConfig, ObserverTuning};
pub use engine::{DebounceToken, PassOutcome, SyncDiagnostic, SyncEngine, SyncEvent};
pub use identity::AssignedIdentity;
pub use visibility::{Rect, VisibilityMap, VisibilityTransition};
