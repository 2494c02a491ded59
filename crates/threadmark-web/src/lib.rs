#![forbid(unsafe_code)]

//! `threadmark-web` is the browser surface of the Threadmark navigation
//! overlay: a content script that injects a side panel listing the user's
//! own messages in a chat conversation and keeps it synchronized as the
//! host page mutates.
//!
//! Design goals:
//! - **The host page owns the DOM**: this crate only reads the document,
//!   owns one injected panel subtree, and records identifier attributes on
//!   message nodes it located; nothing else is ever touched.
//! - **Deterministic core**: all state, timing, and consistency decisions
//!   live in `threadmark-core`; this crate supplies the observers, timers,
//!   and panel plumbing around it.
//! - **Best-effort, silently degrading**: unsupported origins leave the
//!   script inert, empty adapter results remove the panel, and every
//!   failure self-heals on the next scheduled resynchronization.
//!
//! The pure modules ([`adapters`], [`contract`], [`trace`]) compile and test
//! natively; the browser glue is gated to `wasm32`.

pub mod adapters;
pub mod contract;
pub mod trace;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod observers;

#[cfg(target_arch = "wasm32")]
pub use app::{BootError, activate, trace_jsonl};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

/// Content-script entry point: initialize once the document is interactive.
/// Unsupported origins no-op immediately.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    app::activate();
}

/// Debugging hook for the embedding host: the engine's recent diagnostics as
/// JSONL, one event per line.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn threadmark_trace() -> String {
    app::trace_jsonl()
}
