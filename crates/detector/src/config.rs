//! 감독 설정
//!
//! core의 [`DetectorConfig`](canwatch_core::config::DetectorConfig)에서
//! 프로세스 감독에 필요한 값만 꺼냅니다.

use std::time::Duration;

use canwatch_core::config::DetectorConfig;

/// 기본 정상 종료 대기 시간
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// 탐지기 감독 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// SIGTERM 이후 강제 종료까지 기다리는 시간
    pub stop_timeout: Duration,
}

impl SupervisorConfig {
    /// core 설정에서 생성합니다.
    pub fn from_core(core: &DetectorConfig) -> Self {
        Self {
            stop_timeout: Duration::from_secs(core.stop_timeout_secs),
        }
    }

    /// 종료 대기 시간을 변경합니다.
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }
}
