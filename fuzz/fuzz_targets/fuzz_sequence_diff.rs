#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use threadmark_core::diff::sequence_changed;

#[derive(Debug, Arbitrary)]
struct Input {
    old: Vec<String>,
    new: Vec<String>,
}

fuzz_target!(|input: Input| {
    let changed = sequence_changed(&input.new, &input.old);

    // Post-conditions that must always hold:
    assert_eq!(changed, input.new != input.old, "diff is sequence equality");
    assert!(!sequence_changed(&input.new, &input.new), "reflexivity");
    assert!(!sequence_changed(&input.old, &input.old), "reflexivity");
    assert_eq!(
        sequence_changed(&input.old, &input.new),
        changed,
        "symmetry"
    );
});
