// fuzz/fuzz_targets/update_decoder.rs
//
// The update decoder sits directly behind the push transport: arbitrary
// bytes in, JobUpdate or a classified error out. It must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = clipdeck_types::JobUpdate::from_json(&value);
    }
});
