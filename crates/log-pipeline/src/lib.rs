//! canwatch 알림 로그 파이프라인
//!
//! 외부 탐지기(`ids_engine.py`)가 추가 기록하는 알림 로그 파일을 읽고
//! 구조화된 [`AlertRecord`](canwatch_core::types::AlertRecord)로 변환합니다.
//!
//! # 모듈 구성
//!
//! - [`parser`]: `[<timestamp>] [ALERT] <message>` 라인 파서
//! - [`store`]: 알림 로그 파일 생성 및 전체 재파싱
//! - [`collector`]: 알림 로그를 주기적으로 폴링하는 테일러
//! - [`alert`]: 알림 종류/심각도별 집계
//! - [`config`]: 테일러 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! ids_engine.py --append--> ids_alerts.log
//!                              |         |
//!                      LogTailer (poll)  AlertLog::read_all (GET /get_alerts)
//!                              |         |
//!                         AlertLineParser (parse_all)
//!                              |
//!                     mpsc<AlertRecord> --> daemon alert logger
//! ```

pub mod alert;
pub mod collector;
pub mod config;
pub mod error;
pub mod parser;
pub mod store;

// --- 주요 타입 re-export ---

// 설정
pub use config::TailerConfig;

// 에러
pub use error::LogPipelineError;

// 파서
pub use parser::{AlertLineParser, parse_all};

// 테일러
pub use collector::{CollectorStatus, LogTailer, TailerHandle};

// 저장소
pub use store::AlertLog;

// 집계
pub use alert::AlertSummary;
