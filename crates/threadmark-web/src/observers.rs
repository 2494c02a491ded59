#![forbid(unsafe_code)]

//! Browser observation and scheduling primitives.
//!
//! Thin RAII wrappers over `MutationObserver`, `IntersectionObserver`, and
//! the window timer APIs. Each wrapper owns its callback closure: dropping
//! the wrapper disconnects/cancels first, so the browser can never invoke a
//! freed closure. Replacing an `Option<TimeoutHandle>` slot is therefore the
//! cancel-and-replace debounce primitive the engine's token protocol
//! expects.

use core::time::Duration;

use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, MutationObserver, MutationObserverInit, MutationRecord, Window,
};

use threadmark_core::{ObserverTuning, Rect, VisibilityTransition};

use crate::contract::MESSAGE_ID_ATTR;

/// Subtree-wide child-list mutation subscription on the page body.
pub struct MutationWatch {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl MutationWatch {
    /// Start observing. `on_structural` fires once per callback batch that
    /// added or removed nodes anywhere under `body`.
    pub fn start(
        body: &HtmlElement,
        mut on_structural: impl FnMut() + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, _observer: MutationObserver| {
                if records_touch_child_lists(&records) {
                    on_structural();
                }
            },
        );
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer.observe_with_options(body.as_ref(), &options)?;
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for MutationWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

fn records_touch_child_lists(records: &Array) -> bool {
    records.iter().any(|value| {
        value.dyn_ref::<MutationRecord>().is_some_and(|record| {
            record.added_nodes().length() > 0 || record.removed_nodes().length() > 0
        })
    })
}

/// Intersection subscription over the current message set. At most one is
/// alive at a time; the previous one is dropped (and thereby disconnected)
/// before a new one is created.
pub struct VisibilityWatch {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl VisibilityWatch {
    pub fn observe(
        tuning: ObserverTuning,
        targets: &[Element],
        mut on_transitions: impl FnMut(Vec<VisibilityTransition>) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let transitions = transitions_of(&entries);
                if !transitions.is_empty() {
                    on_transitions(transitions);
                }
            },
        );
        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(tuning.threshold));
        options.set_root_margin(&tuning.root_margin());
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
        for target in targets {
            observer.observe(target);
        }
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for VisibilityWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

fn transitions_of(entries: &Array) -> Vec<VisibilityTransition> {
    let mut transitions = Vec::new();
    for value in entries.iter() {
        let Some(entry) = value.dyn_ref::<IntersectionObserverEntry>() else {
            continue;
        };
        // Untracked targets (attribute stripped by the host) just drop out.
        let Some(id) = entry.target().get_attribute(MESSAGE_ID_ATTR) else {
            continue;
        };
        if entry.is_intersecting() {
            let rect = entry.bounding_client_rect();
            transitions.push(VisibilityTransition::Entered {
                id,
                rect: Rect {
                    top: rect.top(),
                    left: rect.left(),
                    width: rect.width(),
                    height: rect.height(),
                },
            });
        } else {
            transitions.push(VisibilityTransition::Exited { id });
        }
    }
    transitions
}

/// A one-shot window timer, canceled on drop.
pub struct TimeoutHandle {
    window: Window,
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl TimeoutHandle {
    pub fn schedule(
        window: &Window,
        delay: Duration,
        f: impl FnMut() + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut()>::new(f);
        let id = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            clamp_ms(delay),
        )?;
        Ok(Self {
            window: window.clone(),
            id,
            _callback: callback,
        })
    }
}

impl Drop for TimeoutHandle {
    fn drop(&mut self) {
        self.window.clear_timeout_with_handle(self.id);
    }
}

/// A repeating window interval, canceled on drop.
pub struct IntervalHandle {
    window: Window,
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl IntervalHandle {
    pub fn repeat(
        window: &Window,
        period: Duration,
        f: impl FnMut() + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut()>::new(f);
        let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            clamp_ms(period),
        )?;
        Ok(Self {
            window: window.clone(),
            id,
            _callback: callback,
        })
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.id);
    }
}

/// Defer `f` to the next animation-frame boundary.
///
/// The closure frees itself after the frame callback runs; if the page tears
/// down first, the host reclaims it with the rest of the script realm.
pub fn request_frame(window: &Window, f: impl FnOnce() + 'static) -> Result<(), JsValue> {
    let callback = Closure::once_into_js(f);
    let _ = window.request_animation_frame(callback.unchecked_ref())?;
    Ok(())
}

fn clamp_ms(duration: Duration) -> i32 {
    duration.as_millis().min(i32::MAX as u128) as i32
}
