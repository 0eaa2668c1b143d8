//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 알림 로그 처리 중 발생하는 모든 에러를 표현합니다.
//! `From<LogPipelineError> for CanwatchError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use canwatch_core::error::CanwatchError;

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 수집기 에러 (파일 I/O 등)
    #[error("collector error: {source_type}: {reason}")]
    Collector {
        /// 수집 소스 유형 (file 등)
        source_type: String,
        /// 에러 사유
        reason: String,
    },

    /// 알림 로그 파일 에러
    #[error("alert log error: {path}: {source}")]
    AlertLog {
        /// 알림 로그 경로
        path: String,
        /// 원인 I/O 에러
        #[source]
        source: std::io::Error,
    },

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),
}

impl From<LogPipelineError> for CanwatchError {
    fn from(err: LogPipelineError) -> Self {
        CanwatchError::Pipeline(err.to_string())
    }
}
