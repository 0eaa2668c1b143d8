#![no_main]

use canwatch_log_pipeline::parse_all;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let first = parse_all(&text);

    // 비어 있지 않은 라인 수를 넘지 않고, 같은 입력은 같은 결과
    let non_blank = text.lines().filter(|l| !l.trim().is_empty()).count();
    assert!(first.len() <= non_blank);
    assert_eq!(first, parse_all(&text));
});
