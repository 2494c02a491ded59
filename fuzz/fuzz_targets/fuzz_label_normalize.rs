#![no_main]

use libfuzzer_sys::fuzz_target;
use threadmark_core::label::{EMPTY_LABEL_PLACEHOLDER, normalize_label};
use unicode_width::UnicodeWidthChar;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let max_width = usize::from(data[0] % 128);
    let Ok(raw) = core::str::from_utf8(&data[1..]) else {
        return;
    };

    let label = normalize_label(raw, max_width);

    // Post-conditions that must always hold:
    assert!(!label.is_empty(), "label is never empty");
    assert!(
        !label.starts_with(char::is_whitespace) && !label.ends_with(char::is_whitespace)
            || label == EMPTY_LABEL_PLACEHOLDER,
        "label is trimmed"
    );
    assert!(!label.contains('\n'), "label is a single line");
    if max_width > 0 && label != EMPTY_LABEL_PLACEHOLDER {
        let width: usize = label
            .chars()
            .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
            .sum();
        assert!(width <= max_width, "label overflows the column budget");
    }
});
