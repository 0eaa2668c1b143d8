//! 알림 로그 파싱 모듈
//!
//! 탐지기가 기록하는 `[<timestamp>] [ALERT] <message>` 형식의 라인을
//! [`AlertRecord`]로 변환합니다. 파서는 core의
//! [`LogParser`](canwatch_core::pipeline::LogParser) trait을 구현합니다.
//!
//! # 사용 예시
//! ```
//! use canwatch_log_pipeline::parser::parse_all;
//!
//! let alerts = parse_all("[2024-01-01T00:00:00] [ALERT] Replay Attack detected for ID 0x123: repeated frame\n");
//! assert_eq!(alerts.len(), 1);
//! assert_eq!(alerts[0].can_id, "0x123");
//! ```

pub mod alert_line;

pub use alert_line::AlertLineParser;

use canwatch_core::metrics as m;
use canwatch_core::pipeline::LogParser;
use canwatch_core::types::AlertRecord;

/// 기본 파서로 텍스트 전체를 파싱합니다.
///
/// 빈 라인과 형식이 맞지 않는 라인은 건너뛰며, 결과는 라인 순서를 따릅니다.
pub fn parse_all(text: &str) -> Vec<AlertRecord> {
    parse_all_with(&AlertLineParser::new(), text)
}

/// 지정한 파서로 텍스트 전체를 파싱합니다.
///
/// 한 라인의 실패가 나머지 라인의 파싱을 중단시키지 않습니다.
pub fn parse_all_with(parser: &dyn LogParser, text: &str) -> Vec<AlertRecord> {
    let mut alerts = Vec::new();
    let mut skipped = 0u64;

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parser.parse(line) {
            Ok(alert) => alerts.push(alert),
            Err(e) => {
                skipped += 1;
                tracing::debug!(
                    format = parser.format_name(),
                    line = index + 1,
                    error = %e,
                    "skipping malformed alert line"
                );
            }
        }
    }

    if skipped > 0 {
        metrics::counter!(m::ALERT_LINES_SKIPPED_TOTAL).increment(skipped);
    }

    alerts
}
