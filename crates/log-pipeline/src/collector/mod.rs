//! 로그 수집 모듈 -- 알림 로그 파일을 폴링하여 새로 추가된 내용을 읽습니다.
//!
//! # 수집 소스
//! - [`LogTailer`]: 파일 감시 (`tail -f`와 유사한 폴링 방식)
//!
//! # 아키텍처
//! 테일러는 자체 tokio 태스크에서 실행되며, 새로 관측한 알림을
//! `tokio::mpsc::Sender<AlertRecord>` 채널로 전달합니다.

pub mod file;

pub use file::{LogTailer, TailerHandle};

/// 수집기 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorStatus {
    /// 실행 대기 중
    Idle,
    /// 실행 중
    Running,
    /// 정상 종료됨
    Stopped,
}

impl CollectorStatus {
    /// 소문자 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}
