#![forbid(unsafe_code)]

//! DOM plumbing: message collection, identity recording, and the injected
//! panel subtree.
//!
//! Write access to the host page is limited to the panel container and the
//! identifier attribute on message nodes the adapter already located;
//! unrelated host content is never touched.

use std::cmp::Ordering;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlElement, Node, NodeList, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

use threadmark_core::collect::normalize_candidates;
use threadmark_core::identity::assign_identifier;
use threadmark_core::label::normalize_label;

use crate::adapters::{SiteProfile, canonicalize_text};
use crate::contract::{
    ACTIVE_CLASS, ENTRY_CLASS, ENTRY_INDICATOR_CLASS, ENTRY_LABEL_CLASS, MESSAGE_ID_ATTR,
    PANEL_CLASS, PANEL_ID, PANEL_LIST_CLASS,
};

/// Collect the site's user messages: run the query tiers in priority order,
/// keep the first non-empty result, then dedupe and order by document
/// position.
pub fn collect_messages(document: &Document, profile: &SiteProfile) -> Vec<Element> {
    for tier in profile.message_query_tiers {
        let Ok(list) = document.query_selector_all(tier) else {
            continue;
        };
        let elements = elements_of(&list);
        if !elements.is_empty() {
            return normalize_candidates(
                elements,
                |a, b| a.is_same_node(Some(b.as_ref())),
                document_order,
            );
        }
    }
    Vec::new()
}

fn elements_of(list: &NodeList) -> Vec<Element> {
    let mut elements = Vec::with_capacity(list.length() as usize);
    for index in 0..list.length() {
        if let Some(node) = list.item(index)
            && let Ok(element) = node.dyn_into::<Element>()
        {
            elements.push(element);
        }
    }
    elements
}

fn document_order(a: &Element, b: &Element) -> Ordering {
    let mask = a.compare_document_position(b.as_ref());
    if mask & Node::DOCUMENT_POSITION_FOLLOWING != 0 {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Ensure the message carries an identifier, recording a fresh one on the
/// node when needed, and return it.
pub fn ensure_identity(element: &Element, profile: &SiteProfile, index: usize) -> String {
    let existing = element.get_attribute(MESSAGE_ID_ATTR);
    let container_id = durable_container_id(element, profile);
    let assigned = assign_identifier(
        existing.as_deref(),
        container_id.as_deref(),
        index,
        entropy_suffix,
    );
    if assigned.newly_assigned {
        // Only fails for an invalid attribute name; ours is a static
        // constant.
        let _ = element.set_attribute(MESSAGE_ID_ATTR, &assigned.id);
    }
    assigned.id
}

fn durable_container_id(element: &Element, profile: &SiteProfile) -> Option<String> {
    let container = nearest_anchor(element, profile)?;
    let id = container.id();
    (!id.is_empty()).then_some(id)
}

fn nearest_anchor(element: &Element, profile: &SiteProfile) -> Option<Element> {
    profile
        .anchor_selectors
        .iter()
        .find_map(|selector| element.closest(selector).ok().flatten())
}

fn entropy_suffix() -> String {
    // Five hex chars of randomness; enough to disambiguate positional
    // collisions within one page lifetime.
    format!("{:05x}", (js_sys::Math::random() * 1_048_576.0) as u32)
}

/// Extract the raw label text for a message via the profile's label rule.
pub fn extract_label(element: &Element, profile: &SiteProfile) -> String {
    let source = profile
        .label_selector
        .and_then(|selector| element.query_selector(selector).ok().flatten())
        .unwrap_or_else(|| element.clone());
    let raw = source
        .dyn_ref::<HtmlElement>()
        .map(HtmlElement::inner_text)
        .unwrap_or_else(|| source.text_content().unwrap_or_default());
    canonicalize_text(&raw)
}

/// Scroll the message's anchor container (or the message itself) into view.
pub fn scroll_to_message(element: &Element, profile: &SiteProfile) {
    let target = nearest_anchor(element, profile).unwrap_or_else(|| element.clone());
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(ScrollLogicalPosition::Start);
    target.scroll_into_view_with_scroll_into_view_options(&options);
}

fn find_panel(document: &Document) -> Option<Element> {
    document.get_element_by_id(PANEL_ID)
}

fn ensure_panel(document: &Document) -> Result<Element, JsValue> {
    if let Some(panel) = find_panel(document) {
        return Ok(panel);
    }
    let panel = document.create_element("div")?;
    panel.set_id(PANEL_ID);
    panel.set_class_name(PANEL_CLASS);

    let list = document.create_element("div")?;
    list.set_class_name(PANEL_LIST_CLASS);
    panel.append_child(list.as_ref())?;

    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    body.append_child(panel.as_ref())?;
    Ok(panel)
}

/// Remove the panel subtree entirely. No-op when it was never created.
pub fn remove_panel(document: &Document) {
    if let Some(panel) = find_panel(document) {
        panel.remove();
    }
}

/// Rebuild the panel's entry list from the ordered `(message, identifier)`
/// sequence. Returns the activation closures, which the caller must keep
/// alive for as long as the entries exist.
pub fn render_entries(
    document: &Document,
    messages: &[(Element, String)],
    profile: &'static SiteProfile,
    max_label_width: usize,
) -> Result<Vec<Closure<dyn FnMut()>>, JsValue> {
    let panel = ensure_panel(document)?;
    let list = panel
        .query_selector(&format!(".{PANEL_LIST_CLASS}"))?
        .ok_or_else(|| JsValue::from_str("panel list is missing"))?;

    // Full rebuild: the change detector already gates this call to
    // only-on-change, so reconciling entry-by-entry buys nothing here.
    list.set_inner_html("");

    let mut handlers = Vec::with_capacity(messages.len());
    for (element, id) in messages {
        let full_label = normalize_label(&extract_label(element, profile), 0);
        let clipped_label = normalize_label(&full_label, max_label_width);

        let entry = document.create_element("button")?;
        entry.set_class_name(ENTRY_CLASS);
        entry.set_attribute(MESSAGE_ID_ATTR, id)?;
        entry.set_attribute("title", &full_label)?;

        let indicator = document.create_element("div")?;
        indicator.set_class_name(ENTRY_INDICATOR_CLASS);
        entry.append_child(indicator.as_ref())?;

        let label = document.create_element("span")?;
        label.set_class_name(ENTRY_LABEL_CLASS);
        label.set_text_content(Some(&clipped_label));
        entry.append_child(label.as_ref())?;

        let handler = activation_handler(document.clone(), element.clone(), id.clone(), profile);
        entry.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())?;
        handlers.push(handler);

        list.append_child(entry.as_ref())?;
    }

    Ok(handlers)
}

fn activation_handler(
    document: Document,
    message: Element,
    id: String,
    profile: &'static SiteProfile,
) -> Closure<dyn FnMut()> {
    Closure::new(move || {
        scroll_to_message(&message, profile);
        set_active(&document, &id);
    })
}

/// Toggle the active class so exactly the entry matching `id` carries it.
pub fn set_active(document: &Document, id: &str) {
    let Some(panel) = find_panel(document) else {
        return;
    };
    let Ok(entries) = panel.query_selector_all(&format!(".{ENTRY_CLASS}")) else {
        return;
    };
    for entry in elements_of(&entries) {
        let is_active = entry.get_attribute(MESSAGE_ID_ATTR).as_deref() == Some(id);
        let _ = entry.class_list().toggle_with_force(ACTIVE_CLASS, is_active);
    }
}
