#![forbid(unsafe_code)]

//! The content-script controller.
//!
//! One [`App`] instance per document lifetime owns the engine state, the
//! observer subscriptions, and every live callback closure. It is rooted in
//! a thread-local slot because browser callbacks re-enter the module through
//! plain function pointers; all of them run on the page's single main
//! execution context, so the only interleaving is between complete
//! callbacks, never within one.
//!
//! Teardown is implicit: when the page unloads, the script realm (and with
//! it every observer and timer wrapper) is reclaimed wholesale.

use std::cell::RefCell;

use tracing::{debug, trace, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Window};
use web_time::Instant;

use threadmark_core::{DebounceToken, EngineConfig, PassOutcome, SyncEngine, VisibilityMap};

use crate::adapters::Site;
use crate::dom;
use crate::observers::{IntervalHandle, MutationWatch, TimeoutHandle, VisibilityWatch, request_frame};
use crate::trace::TraceBuffer;

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// Why initialization could not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootError {
    MissingWindow,
    MissingDocument,
    MissingBody,
    Dom(String),
}

impl core::fmt::Display for BootError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingWindow => write!(f, "no window in this realm"),
            Self::MissingDocument => write!(f, "window has no document"),
            Self::MissingBody => write!(f, "document has no body"),
            Self::Dom(message) => write!(f, "dom operation failed: {message}"),
        }
    }
}

impl std::error::Error for BootError {}

struct App {
    window: Window,
    document: Document,
    site: Site,
    config: EngineConfig,
    engine: SyncEngine,
    visibility: VisibilityMap,
    trace: TraceBuffer,
    booted_at: Instant,
    visibility_watch: Option<VisibilityWatch>,
    debounce_timer: Option<TimeoutHandle>,
    settle_timer: Option<TimeoutHandle>,
    entry_handlers: Vec<Closure<dyn FnMut()>>,
    _mutation_watch: MutationWatch,
    _location_poll: IntervalHandle,
}

/// Initialize once the document is interactive: run immediately, or defer to
/// `DOMContentLoaded` when the document is still loading.
pub fn activate() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    if document.ready_state() == "loading" {
        let callback = Closure::once_into_js(boot_logged);
        if document
            .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
            .is_err()
        {
            boot_logged();
        }
    } else {
        boot_logged();
    }
}

fn boot_logged() {
    if let Err(err) = boot() {
        warn!(%err, "navigation overlay failed to initialize");
    }
}

fn boot() -> Result<(), BootError> {
    let window = web_sys::window().ok_or(BootError::MissingWindow)?;
    let document = window.document().ok_or(BootError::MissingDocument)?;
    let body = document.body().ok_or(BootError::MissingBody)?;

    let host = window.location().host().unwrap_or_default();
    let Some(site) = Site::for_host(&host) else {
        // Recognized non-applicability, not an error: stay inert, attach
        // nothing.
        debug!(%host, "unsupported origin; navigation overlay stays inert");
        return Ok(());
    };

    let config = EngineConfig::default();
    let mutation_watch = MutationWatch::start(&body, schedule_resync)
        .map_err(|err| BootError::Dom(format!("{err:?}")))?;
    let location_poll =
        IntervalHandle::repeat(&window, config.location_poll_interval, poll_location)
            .map_err(|err| BootError::Dom(format!("{err:?}")))?;

    let mut engine = SyncEngine::new();
    // Baseline the URL so the first poll sample is not read as navigation.
    let _ = engine.observe_location(&current_href(&window));

    let app = App {
        window,
        document,
        site,
        config,
        engine,
        visibility: VisibilityMap::new(),
        trace: TraceBuffer::new(),
        booted_at: Instant::now(),
        visibility_watch: None,
        debounce_timer: None,
        settle_timer: None,
        entry_handlers: Vec::new(),
        _mutation_watch: mutation_watch,
        _location_poll: location_poll,
    };
    APP.with(|slot| slot.replace(Some(app)));

    debug!(site = site.as_str(), "navigation overlay active");
    start_pass();
    Ok(())
}

/// Export the diagnostics ring as JSONL. Empty when the overlay is inert.
pub fn trace_jsonl() -> String {
    APP.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|app| app.trace.jsonl())
            .unwrap_or_default()
    })
}

/// Mutation-batch entry point: arm (or re-arm) the debounce.
fn schedule_resync() {
    APP.with(|slot| {
        let mut borrow = slot.borrow_mut();
        let Some(app) = borrow.as_mut() else {
            return;
        };
        let token = app.engine.schedule();
        let window = app.window.clone();
        match TimeoutHandle::schedule(&window, app.config.debounce_window, move || {
            debounce_fired(token);
        }) {
            // Replacing the slot cancels the superseded timer.
            Ok(handle) => app.debounce_timer = Some(handle),
            Err(err) => warn!(?err, "failed to arm the debounce timer"),
        }
    });
}

fn debounce_fired(token: DebounceToken) {
    let current = APP.with(|slot| {
        let mut borrow = slot.borrow_mut();
        borrow
            .as_mut()
            .is_some_and(|app| app.engine.debounce_elapsed(token))
    });
    if current {
        start_pass();
    }
}

/// Enter the resynchronization critical section and defer the work to the
/// next animation frame. Requests arriving while a pass is in flight are
/// dropped; the next mutation re-triggers naturally.
fn start_pass() {
    let window = APP.with(|slot| {
        let mut borrow = slot.borrow_mut();
        let app = borrow.as_mut()?;
        app.engine.begin_pass().then(|| app.window.clone())
    });
    let Some(window) = window else {
        return;
    };
    if let Err(err) = request_frame(&window, run_pass) {
        warn!(?err, "animation frame unavailable; running the pass inline");
        run_pass();
    }
}

fn run_pass() {
    APP.with(|slot| {
        let mut borrow = slot.borrow_mut();
        let Some(app) = borrow.as_mut() else {
            return;
        };
        let profile = app.site.profile();

        let messages = dom::collect_messages(&app.document, profile);
        let mut labeled: Vec<(Element, String)> = Vec::with_capacity(messages.len());
        for (index, element) in messages.iter().enumerate() {
            let id = dom::ensure_identity(element, profile, index);
            labeled.push((element.clone(), id));
        }
        let ids: Vec<String> = labeled.iter().map(|(_, id)| id.clone()).collect();

        match app.engine.complete_pass(ids) {
            PassOutcome::Unchanged { count } => {
                trace!(count, "resynchronization pass: no change");
            }
            PassOutcome::Render { count } => {
                match dom::render_entries(&app.document, &labeled, profile, app.config.max_label_width)
                {
                    Ok(handlers) => app.entry_handlers = handlers,
                    Err(err) => warn!(?err, "panel rebuild failed"),
                }
                // Re-subscribe visibility tracking over the fresh node set.
                app.visibility.clear();
                app.visibility_watch = None;
                match VisibilityWatch::observe(
                    app.config.observer,
                    &messages,
                    on_visibility_transitions,
                ) {
                    Ok(watch) => app.visibility_watch = Some(watch),
                    Err(err) => warn!(?err, "visibility subscription failed"),
                }
                debug!(count, "panel rebuilt");
            }
            PassOutcome::Clear => {
                dom::remove_panel(&app.document);
                app.entry_handlers.clear();
                app.visibility.clear();
                app.visibility_watch = None;
                debug!("message set emptied; panel removed");
            }
        }

        let elapsed_ms = u64::try_from(app.booted_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        let drained = app.engine.drain_diagnostics();
        app.trace.absorb(&drained, elapsed_ms);
    });
}

fn on_visibility_transitions(transitions: Vec<threadmark_core::VisibilityTransition>) {
    APP.with(|slot| {
        let mut borrow = slot.borrow_mut();
        let Some(app) = borrow.as_mut() else {
            return;
        };
        app.visibility.apply(transitions);
        // Selection only runs against a non-empty map; when nothing is
        // visible the previous highlight is left alone.
        if let Some(id) = app.visibility.active_entry() {
            dom::set_active(&app.document, id);
        }
    });
}

/// Location-poll tick: single-page-app route changes do not reliably fire
/// events observable from injected code, so the URL is compared each period.
fn poll_location() {
    let navigated = APP.with(|slot| {
        let mut borrow = slot.borrow_mut();
        let Some(app) = borrow.as_mut() else {
            return false;
        };
        let href = current_href(&app.window);
        if !app.engine.observe_location(&href) {
            return false;
        }
        let window = app.window.clone();
        match TimeoutHandle::schedule(&window, app.config.navigation_settle_delay, start_pass) {
            Ok(handle) => app.settle_timer = Some(handle),
            Err(err) => warn!(?err, "failed to arm the settle timer"),
        }
        true
    });
    if navigated {
        debug!("navigation detected; resynchronization follows the settle delay");
    }
}

fn current_href(window: &Window) -> String {
    window.location().href().unwrap_or_default()
}
