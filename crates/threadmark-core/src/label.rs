#![forbid(unsafe_code)]

//! Display-label normalization for panel entries.
//!
//! Raw text extracted from a message node arrives with whatever whitespace
//! the host page's layout produced: leading indentation, interior newlines,
//! tab runs. The panel shows a single compact line per entry, so the label
//! rule is: trim, collapse interior whitespace runs to one space, substitute
//! a fixed placeholder for empty text, and clip to a display-column budget.
//!
//! Clipping counts terminal-style display columns (`unicode-width`), not
//! bytes or chars, so CJK text does not overflow a column budget that ASCII
//! fits in.

use unicode_width::UnicodeWidthChar;

/// Fixed placeholder shown when a message yields no visible text.
pub const EMPTY_LABEL_PLACEHOLDER: &str = "(empty message)";

const ELLIPSIS: char = '…';

/// Normalize `raw` into a panel label clipped to `max_width` display
/// columns. A `max_width` of zero disables clipping.
#[must_use]
pub fn normalize_label(raw: &str, max_width: usize) -> String {
    let collapsed = collapse_whitespace(raw);
    if collapsed.is_empty() {
        return EMPTY_LABEL_PLACEHOLDER.to_owned();
    }
    if max_width == 0 {
        return collapsed;
    }
    clip_to_width(&collapsed, max_width)
}

/// Trim and collapse every interior whitespace run to a single space.
#[must_use]
pub fn collapse_whitespace(raw: &str) -> String {
    let mut collapsed = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !collapsed.is_empty() {
            collapsed.push(' ');
        }
        collapsed.push_str(word);
    }
    collapsed
}

fn clip_to_width(text: &str, max_width: usize) -> String {
    let total: usize = text
        .chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum();
    if total <= max_width {
        return text.to_owned();
    }

    // Reserve one column for the ellipsis.
    let budget = max_width.saturating_sub(1);
    let mut clipped = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + width > budget {
            break;
        }
        clipped.push(ch);
        used += width;
    }
    while clipped.ends_with(' ') {
        clipped.pop();
    }
    clipped.push(ELLIPSIS);
    clipped
}
