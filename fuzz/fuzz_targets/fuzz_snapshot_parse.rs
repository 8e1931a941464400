#![no_main]

use dropdesk::sync::parse_snapshot;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(snapshot) = parse_snapshot(text) {
        assert!(!snapshot.version.is_empty());
        assert!(!snapshot.export_date.is_empty());
        // A parsed snapshot must serialize and parse again.
        let json = serde_json::to_string(&snapshot).expect("serialize");
        assert_eq!(parse_snapshot(&json).expect("reparse"), snapshot);
    }
});
