#![forbid(unsafe_code)]

//! Site adapters: where to find user messages on each supported host.
//!
//! An adapter is pure data: prioritized selector tiers plus the host page's
//! anchor and label rules. Resolution is a substring lookup over the page
//! origin; unsupported hosts resolve to nothing, which leaves the whole
//! engine inert (no panel, no observers).
//!
//! Selector tiers degrade in a fixed priority order: the collector runs each
//! tier against the document and keeps the first non-empty result, so a host
//! page redesign that breaks the primary selector can still be caught by a
//! looser fallback.

use unicode_normalization::UnicodeNormalization;

/// A supported host site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    ChatGpt,
    Gemini,
}

/// Message-locating rules for one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteProfile {
    /// Message queries, strongest first; the first non-empty tier wins.
    pub message_query_tiers: &'static [&'static str],
    /// Ancestor selectors naming the durable container, strongest first.
    /// The container doubles as the scroll target: the page maintains its
    /// identity, so scrolling to it survives inner re-renders.
    pub anchor_selectors: &'static [&'static str],
    /// Selector for the label-source element inside a message, when the
    /// message node itself is not the best text source.
    pub label_selector: Option<&'static str>,
}

const CHATGPT_PROFILE: SiteProfile = SiteProfile {
    message_query_tiers: &[
        r#"[data-message-author-role="user"]"#,
        r#"article[data-testid^="conversation-turn-"] [data-message-author-role="user"]"#,
    ],
    anchor_selectors: &[".conversation-container", "article"],
    label_selector: None,
};

const GEMINI_PROFILE: SiteProfile = SiteProfile {
    message_query_tiers: &[
        "user-query",
        ".conversation-container user-query, .query-text",
    ],
    anchor_selectors: &[".conversation-container", "article"],
    label_selector: Some(".query-text"),
};

impl Site {
    /// Resolve the adapter for a page host, e.g. `"chatgpt.com"`.
    #[must_use]
    pub fn for_host(host: &str) -> Option<Self> {
        if host.contains("chatgpt.com") || host.contains("chat.openai.com") {
            return Some(Self::ChatGpt);
        }
        if host.contains("gemini.google.com") {
            return Some(Self::Gemini);
        }
        None
    }

    #[must_use]
    pub const fn profile(self) -> &'static SiteProfile {
        match self {
            Self::ChatGpt => &CHATGPT_PROFILE,
            Self::Gemini => &GEMINI_PROFILE,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChatGpt => "chatgpt",
            Self::Gemini => "gemini",
        }
    }
}

/// Canonicalize extracted label text to NFC before width-aware clipping.
///
/// Host pages mix precomposed and decomposed forms (notably pasted text);
/// normalizing keeps identical-looking labels byte-identical.
#[must_use]
pub fn canonicalize_text(raw: &str) -> String {
    raw.nfc().collect()
}
