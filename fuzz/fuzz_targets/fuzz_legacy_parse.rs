#![no_main]

use dropdesk::sync::legacy::parse_legacy;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_legacy(text);
    }
});
