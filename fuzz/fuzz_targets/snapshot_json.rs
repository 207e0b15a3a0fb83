// this_file: fuzz/fuzz_targets/snapshot_json.rs

//! Arbitrary snapshot JSON must never panic the validator or the stack
//! builder, and validation must settle after one pass.

#![no_main]

use fontweave::{build_stack, font_for_char, validate, LanguageId, Snapshot};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut snapshot) = Snapshot::from_json(json) else {
        return;
    };

    for style in &mut snapshot.styles {
        validate(style);
        assert!(validate(style).is_clean(), "validation did not settle");

        let mut languages: Vec<LanguageId> = style.languages.iter().cloned().collect();
        languages.push(LanguageId::new("und"));
        for language in &languages {
            let stack = build_stack(style, language);
            assert!(!stack.is_empty(), "stack without fonts or system entry");
            let _ = font_for_char(style, language, 'a');
        }
    }
});
