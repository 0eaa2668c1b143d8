//! 탐지기 감독 에러 타입
//!
//! `From<DetectorError> for CanwatchError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use canwatch_core::error::CanwatchError;

/// 탐지기 감독 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// 이미 추적 중인 프로세스가 있음
    #[error("Detection is already running")]
    AlreadyRunning,

    /// 추적 중인 프로세스가 없음
    #[error("No detection is currently running")]
    NotRunning,

    /// 프로세스 생성 실패
    #[error("failed to spawn detector '{program}': {reason}")]
    SpawnFailed {
        /// 실행하려던 프로그램
        program: String,
        /// 실패 사유
        reason: String,
    },

    /// 종료 신호 전송 또는 대기 실패 (강제 종료 후 보고)
    #[error("failed to terminate detector: {0}")]
    TerminationFailed(String),

    /// 제한 시간 안에 종료되지 않음 (강제 종료 후 보고)
    #[error("detector (pid {pid}) did not exit within {timeout_secs:.1}s, killed")]
    TerminationTimeout {
        /// 프로세스 ID
        pid: u32,
        /// 대기한 시간 (초)
        timeout_secs: f64,
    },
}

impl DetectorError {
    /// 호출자의 잘못된 요청으로 인한 에러인지 여부
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::AlreadyRunning | Self::NotRunning)
    }
}

impl From<DetectorError> for CanwatchError {
    fn from(err: DetectorError) -> Self {
        CanwatchError::Detector(err.to_string())
    }
}
