#![no_main]

use canwatch_core::pipeline::LogParser;
use canwatch_core::types::AlertType;
use canwatch_log_pipeline::parser::AlertLineParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);
    let parser = AlertLineParser::new();

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    if let Ok(alert) = parser.parse(&line) {
        // 분류는 메시지에서만 결정된다
        assert_eq!(alert.alert_type, AlertType::classify(&alert.message));
        assert!(!alert.can_id.contains(char::is_whitespace));
    }
});
