//! canwatch 탐지기 감독 크레이트
//!
//! 외부 침입 탐지 스크립트 프로세스를 최대 하나만 추적하며
//! 시작, 정상 종료(SIGTERM), 강제 종료를 담당합니다.
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 (`DetectorError`)
//! - [`config`]: 감독 설정 (`SupervisorConfig`)
//! - [`supervisor`]: 프로세스 감독 (`DetectorSupervisor`, `DetectorCommand`)
//!
//! # 상태 전이
//!
//! ```text
//! Idle --start--> Tracked(running) --child exits--> Tracked(exited)
//!   ^                  |                                 |
//!   +------stop--------+---------------stop--------------+
//! ```

pub mod config;
pub mod error;
pub mod supervisor;

pub use config::SupervisorConfig;
pub use error::DetectorError;
pub use supervisor::{DetectorCommand, DetectorStatus, DetectorSupervisor, StopOutcome};
