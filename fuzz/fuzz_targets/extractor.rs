#![no_main]

use libfuzzer_sys::fuzz_target;

use newslens::extractor::cleaner::{MAX_PROMPT_HTML_CHARS, prepare_for_extraction, read_metadata};

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);

    // Neither pass may panic on arbitrary markup
    let prepared = prepare_for_extraction(&html);
    assert!(prepared.chars().count() <= MAX_PROMPT_HTML_CHARS);
    let _ = read_metadata(&html);
});
