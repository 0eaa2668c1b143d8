//! 설정 관리: canwatch.toml 파싱 및 런타임 설정
//!
//! [`CanwatchConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`CANWATCH_API_PORT=5001` 형식)
//! 3. 설정 파일 (`canwatch.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), canwatch_core::error::CanwatchError> {
//! use canwatch_core::config::CanwatchConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = CanwatchConfig::load("canwatch.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = CanwatchConfig::parse("[api]\nport = 5001")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CanwatchError, ConfigError};

/// canwatch 통합 설정
///
/// `canwatch.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanwatchConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// HTTP 제어 API 설정
    #[serde(default)]
    pub api: ApiConfig,
    /// 탐지기 프로세스 설정
    #[serde(default)]
    pub detector: DetectorConfig,
    /// 알림 로그 설정
    #[serde(default)]
    pub alert_log: AlertLogConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl CanwatchConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CanwatchError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 없이 기본값에 환경변수 오버라이드만 적용합니다.
    pub fn from_env() -> Result<Self, CanwatchError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, CanwatchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CanwatchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CanwatchError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, CanwatchError> {
        toml::from_str(toml_str).map_err(|e| {
            CanwatchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `CANWATCH_{SECTION}_{FIELD}`
    /// 예: `CANWATCH_ALERT_LOG_PATH=/var/log/ids_alerts.log`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "CANWATCH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "CANWATCH_GENERAL_LOG_FORMAT");

        // API
        override_string(&mut self.api.listen_addr, "CANWATCH_API_LISTEN_ADDR");
        override_u16(&mut self.api.port, "CANWATCH_API_PORT");

        // Detector
        override_string(
            &mut self.detector.interpreter,
            "CANWATCH_DETECTOR_INTERPRETER",
        );
        override_string(
            &mut self.detector.default_script,
            "CANWATCH_DETECTOR_DEFAULT_SCRIPT",
        );
        override_string(
            &mut self.detector.default_input_log,
            "CANWATCH_DETECTOR_DEFAULT_INPUT_LOG",
        );
        override_u64(
            &mut self.detector.stop_timeout_secs,
            "CANWATCH_DETECTOR_STOP_TIMEOUT_SECS",
        );

        // Alert log
        override_string(&mut self.alert_log.path, "CANWATCH_ALERT_LOG_PATH");
        override_u64(
            &mut self.alert_log.poll_interval_secs,
            "CANWATCH_ALERT_LOG_POLL_INTERVAL_SECS",
        );
        override_usize(
            &mut self.alert_log.channel_capacity,
            "CANWATCH_ALERT_LOG_CHANNEL_CAPACITY",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "CANWATCH_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "CANWATCH_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "CANWATCH_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CanwatchError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.api.port == 0 {
            return Err(invalid("api.port", "must not be 0".to_owned()));
        }

        if self.detector.interpreter.trim().is_empty() {
            return Err(invalid(
                "detector.interpreter",
                "must not be empty".to_owned(),
            ));
        }

        if self.detector.stop_timeout_secs == 0 {
            return Err(invalid(
                "detector.stop_timeout_secs",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.alert_log.path.trim().is_empty() {
            return Err(invalid("alert_log.path", "must not be empty".to_owned()));
        }

        if self.alert_log.poll_interval_secs == 0 {
            return Err(invalid(
                "alert_log.poll_interval_secs",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.alert_log.channel_capacity == 0 {
            return Err(invalid(
                "alert_log.channel_capacity",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(invalid("metrics.port", "must not be 0".to_owned()));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> CanwatchError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// HTTP 제어 API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1".to_owned(),
            port: 5000,
        }
    }
}

/// 탐지기 프로세스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// 탐지 스크립트를 실행할 인터프리터
    pub interpreter: String,
    /// 요청에 script_path가 없을 때 사용할 스크립트
    pub default_script: String,
    /// 요청에 log_file이 없을 때 사용할 CAN 입력 로그
    pub default_input_log: String,
    /// SIGTERM 이후 강제 종료까지 대기 시간 (초)
    pub stop_timeout_secs: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_owned(),
            default_script: "./ids_engine.py".to_owned(),
            default_input_log: "./normal2_can.log".to_owned(),
            stop_timeout_secs: 5,
        }
    }
}

/// 알림 로그 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertLogConfig {
    /// 탐지기가 알림을 기록하는 파일
    pub path: String,
    /// 테일러 폴링 주기 (초)
    pub poll_interval_secs: u64,
    /// 새 알림 채널 용량
    pub channel_capacity: usize,
}

impl Default for AlertLogConfig {
    fn default() -> Self {
        Self {
            path: "ids_alerts.log".to_owned(),
            poll_interval_secs: 1,
            channel_capacity: 256,
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
    /// 스크랩 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
