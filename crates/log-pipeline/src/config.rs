//! 테일러 설정
//!
//! [`TailerConfig`]는 core의 [`AlertLogConfig`](canwatch_core::config::AlertLogConfig)를
//! 기반으로 테일러 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use canwatch_core::config::CanwatchConfig;
//! use canwatch_log_pipeline::config::TailerConfig;
//!
//! let core_config = CanwatchConfig::default();
//! let config = TailerConfig::from_core(&core_config.alert_log);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use canwatch_core::config::AlertLogConfig;

/// 한 라인의 기본 최대 길이 (64KB)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// 알림 로그 테일러 설정
#[derive(Debug, Clone)]
pub struct TailerConfig {
    /// 감시할 알림 로그 경로
    pub path: PathBuf,
    /// 폴링 주기
    pub poll_interval: Duration,
    /// 새 알림 채널 용량
    pub channel_capacity: usize,
    /// 한 라인의 최대 길이 (바이트). 넘으면 그 라인을 버립니다.
    pub max_line_length: usize,
}

impl TailerConfig {
    /// core 설정에서 테일러 설정을 생성합니다.
    pub fn from_core(core: &AlertLogConfig) -> Self {
        Self {
            path: PathBuf::from(&core.path),
            poll_interval: Duration::from_secs(core.poll_interval_secs),
            channel_capacity: core.channel_capacity,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    /// 폴링 주기를 변경합니다.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// 최대 라인 길이를 변경합니다.
    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }
}

impl Default for TailerConfig {
    fn default() -> Self {
        Self::from_core(&AlertLogConfig::default())
    }
}
