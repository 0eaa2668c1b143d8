//! 파이프라인 trait: 파서 확장 포인트 및 헬스 상태 정의

use serde::Serialize;

use crate::error::CanwatchError;
use crate::types::AlertRecord;

/// 알림 로그 라인 파서 trait
///
/// 탐지기가 다른 형식으로 알림을 기록하게 되면 이 trait을 구현합니다.
pub trait LogParser: Send + Sync {
    /// 지원하는 로그 형식 이름
    fn format_name(&self) -> &str;

    /// 한 줄을 알림 레코드로 파싱
    fn parse(&self, line: &str) -> Result<AlertRecord, CanwatchError>;
}

/// 컴포넌트 헬스 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    /// 정상
    Healthy,
    /// 동작은 하지만 주의 필요
    Degraded(String),
    /// 비정상
    Unhealthy(String),
}

impl HealthStatus {
    /// 정상 상태인지 확인합니다.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// 비정상 상태인지 확인합니다.
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy(_))
    }
}
