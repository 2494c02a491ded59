#![forbid(unsafe_code)]

//! The overlay's page-facing DOM contract.
//!
//! Everything the content script writes into the host page is namespaced
//! under the `tmk-` prefix so it can never collide with host classes, and
//! styling shipped alongside the extension targets exactly these hooks.
//! Changing any value here is a breaking change for that stylesheet.

/// Element id of the injected panel container.
pub const PANEL_ID: &str = "tmk-nav";

/// Class on the panel container.
pub const PANEL_CLASS: &str = "tmk-panel";

/// Class on the scrollable entry list inside the panel.
pub const PANEL_LIST_CLASS: &str = "tmk-scroll";

/// Class on each entry button.
pub const ENTRY_CLASS: &str = "tmk-entry";

/// Class on the entry's indicator element.
pub const ENTRY_INDICATOR_CLASS: &str = "tmk-entry-indicator";

/// Class on the entry's label span.
pub const ENTRY_LABEL_CLASS: &str = "tmk-entry-label";

/// Class toggled onto the entry matching the on-screen message.
pub const ACTIVE_CLASS: &str = "tmk-active";

/// Attribute recording a message's identifier, on both the message node and
/// its panel entry.
pub const MESSAGE_ID_ATTR: &str = "data-tmk-id";
