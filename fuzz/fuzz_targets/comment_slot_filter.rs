#![no_main]

use ghpc_comments::comment_filter::body_matches_slot;
use ghpc_comments::comment_slot::{append_minimized_marker, is_minimized_body, CommentSlot};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let slot = CommentSlot::for_command("tflint", "myproj-default");
    let tagged = append_minimized_marker(&raw);
    assert!(is_minimized_body(&tagged));
    assert_eq!(append_minimized_marker(&tagged), tagged);
    let matched_before = body_matches_slot(&raw, slot.title(), &slot.identifier_needle());
    let matched_after = body_matches_slot(&tagged, slot.title(), &slot.identifier_needle());
    if matched_before {
        assert!(matched_after);
    }
});
