//! 도메인 타입: 시스템 전역에서 사용되는 공통 타입
//!
//! 알림 레코드는 저장되지 않습니다. 조회할 때마다 알림 로그 전체를
//! 다시 파싱하여 새로 만들어집니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// CAN ID를 추출할 수 없을 때 사용하는 값
pub const UNKNOWN_CAN_ID: &str = "Unknown";

/// 알림 종류
///
/// 메시지 본문의 부분 문자열로 분류합니다. 직렬화 값은 대시보드가
/// 사용하는 표시 문자열입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    /// 동일 프레임 재전송
    #[serde(rename = "Replay Attack Detected")]
    ReplayAttack,
    /// 허용 목록에 없는 CAN ID
    #[serde(rename = "Unknown CAN ID Detected")]
    UnknownCanId,
    /// 예상과 다른 페이로드
    #[serde(rename = "Unexpected Payload Detected")]
    UnexpectedPayload,
    /// 서비스 거부 의심 (과도한 프레임 빈도)
    #[serde(rename = "DoS Suspected")]
    DosSuspected,
    /// 분류 불가
    #[serde(rename = "Unknown")]
    Unknown,
}

impl AlertType {
    /// 분류 규칙 (먼저 일치한 것이 우선)
    const RULES: [(&'static str, AlertType); 4] = [
        ("Replay Attack", AlertType::ReplayAttack),
        ("Unknown CAN ID", AlertType::UnknownCanId),
        ("Unexpected payload", AlertType::UnexpectedPayload),
        ("DoS suspected", AlertType::DosSuspected),
    ];

    /// 메시지 본문으로 알림 종류를 판별합니다.
    ///
    /// 대소문자를 구분하며 규칙 순서대로 검사합니다.
    pub fn classify(message: &str) -> Self {
        Self::RULES
            .iter()
            .find(|(needle, _)| message.contains(needle))
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::Unknown)
    }

    /// 직렬화 시 사용되는 표시 문자열
    pub fn label(&self) -> &'static str {
        match self {
            Self::ReplayAttack => "Replay Attack Detected",
            Self::UnknownCanId => "Unknown CAN ID Detected",
            Self::UnexpectedPayload => "Unexpected Payload Detected",
            Self::DosSuspected => "DoS Suspected",
            Self::Unknown => "Unknown",
        }
    }

    /// 알림 종류별 심각도
    pub fn severity(&self) -> Severity {
        match self {
            Self::DosSuspected => Severity::Critical,
            Self::UnknownCanId => Severity::High,
            Self::ReplayAttack | Self::UnexpectedPayload => Severity::Medium,
            Self::Unknown => Severity::Low,
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 탐지기가 남긴 알림 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// 대괄호를 제거한 타임스탬프 원문
    pub timestamp: String,
    /// 알림 종류
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// 태그 이후의 메시지 본문
    pub message: String,
    /// 메시지에서 추출한 CAN ID (없으면 `"Unknown"`)
    #[serde(rename = "canId")]
    pub can_id: String,
}

impl AlertRecord {
    /// 알림 심각도
    pub fn severity(&self) -> Severity {
        self.alert_type.severity()
    }
}

impl fmt::Display for AlertRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (CAN ID: {}): {}",
            self.timestamp, self.alert_type, self.can_id, self.message,
        )
    }
}

/// 심각도 레벨
///
/// `Ord` 구현으로 심각도 비교가 가능합니다 (`Low < Medium < High < Critical`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 낮은 심각도
    #[default]
    Low,
    /// 중간 심각도
    Medium,
    /// 높은 심각도
    High,
    /// 치명적: 즉시 대응 필요
    Critical,
}

impl Severity {
    /// 소문자 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
