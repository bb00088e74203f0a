#![no_main]

use ghpc_comments::output_split::split_output;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&limit_byte, rest)) = data.split_first() else {
        return;
    };
    let max_chars = usize::from(limit_byte) + 1;
    let text = String::from_utf8_lossy(rest);
    let parts = split_output(&text, max_chars);
    assert_eq!(parts.concat(), text.as_ref());
    for part in &parts {
        assert!(!part.is_empty());
        assert!(part.chars().count() <= max_chars);
    }
});
