//! 에러 타입: 도메인별 에러 정의

/// canwatch 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum CanwatchError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 탐지기 프로세스 제어 에러
    #[error("detector error: {0}")]
    Detector(String),

    /// 알림 로그 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 빈 라인
    #[error("empty line")]
    Empty,

    /// 필드 수 부족
    #[error("expected at least {expected} fields, found {found}")]
    MissingFields { expected: usize, found: usize },
}
