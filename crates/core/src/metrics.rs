//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `canwatch_`
//! - 모듈명: `detector_`, `tailer_`, `alert_`, `api_`
//! - 접미어: `_total` (counter), `_seconds` (시간), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 알림 종류 레이블 키
pub const LABEL_ALERT_TYPE: &str = "type";

/// 결과 레이블 키 (terminated, exited, killed, failed)
pub const LABEL_RESULT: &str = "result";

/// 엔드포인트 레이블 키
pub const LABEL_ENDPOINT: &str = "endpoint";

// ─── Detector 메트릭 ───────────────────────────────────────────────

/// Detector: 시작된 탐지기 프로세스 수 (counter)
pub const DETECTOR_STARTS_TOTAL: &str = "canwatch_detector_starts_total";

/// Detector: 종료 처리 수 (counter, label: result)
pub const DETECTOR_STOPS_TOTAL: &str = "canwatch_detector_stops_total";

/// Detector: 실행 중 여부 (gauge, 0 또는 1)
pub const DETECTOR_RUNNING: &str = "canwatch_detector_running";

// ─── Tailer 메트릭 ─────────────────────────────────────────────────

/// Tailer: 알림 로그에서 읽은 바이트 수 (counter)
pub const TAILER_BYTES_READ_TOTAL: &str = "canwatch_tailer_bytes_read_total";

/// Tailer: 새로 관측한 알림 수 (counter, label: type)
pub const TAILER_ALERTS_TOTAL: &str = "canwatch_tailer_alerts_total";

/// Tailer: 파일 축소로 커서를 되돌린 횟수 (counter)
pub const TAILER_TRUNCATIONS_TOTAL: &str = "canwatch_tailer_truncations_total";

// ─── Alert 파서 메트릭 ─────────────────────────────────────────────

/// Alert: 형식 오류로 건너뛴 라인 수 (counter)
pub const ALERT_LINES_SKIPPED_TOTAL: &str = "canwatch_alert_lines_skipped_total";

// ─── API / Daemon 메트릭 ───────────────────────────────────────────

/// API: 에러 응답 수 (counter, label: endpoint)
pub const API_ERRORS_TOTAL: &str = "canwatch_api_errors_total";

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "canwatch_daemon_uptime_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        DETECTOR_STARTS_TOTAL,
        "Total number of detector processes spawned"
    );
    describe_counter!(
        DETECTOR_STOPS_TOTAL,
        "Detector stop attempts by result (terminated, exited, killed, failed)"
    );
    describe_gauge!(
        DETECTOR_RUNNING,
        "Whether a detector process is currently tracked (0 or 1)"
    );

    describe_counter!(
        TAILER_BYTES_READ_TOTAL,
        "Total bytes read from the alert log by the tailer"
    );
    describe_counter!(
        TAILER_ALERTS_TOTAL,
        "New alerts observed by the tailer, by alert type"
    );
    describe_counter!(
        TAILER_TRUNCATIONS_TOTAL,
        "Times the tailer cursor was reset because the alert log shrank"
    );

    describe_counter!(
        ALERT_LINES_SKIPPED_TOTAL,
        "Malformed alert log lines skipped by the parser"
    );

    describe_counter!(API_ERRORS_TOTAL, "Control API error responses by endpoint");
    describe_gauge!(DAEMON_UPTIME_SECONDS, "Daemon uptime in seconds");
}
