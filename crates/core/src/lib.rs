//! canwatch 공통 크레이트
//!
//! CAN 버스 침입 탐지 제어 데몬을 구성하는 모든 크레이트가 공유하는
//! 도메인 타입, 파서 trait, 에러, 설정, 메트릭 이름을 정의합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{CanwatchError, ConfigError, ParseError};

// 설정
pub use config::CanwatchConfig;

// 파서 trait / 헬스 상태
pub use pipeline::{HealthStatus, LogParser};

// 도메인 타입
pub use types::{AlertRecord, AlertType, Severity, UNKNOWN_CAN_ID};
