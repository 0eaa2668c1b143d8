//! 알림 집계 -- 대시보드 통계 패널용 종류/심각도별 카운트

use serde::Serialize;

use canwatch_core::types::{AlertRecord, AlertType, Severity};

/// 심각도별 알림 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

/// 알림 종류별 집계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    /// 전체 알림 수
    pub total: usize,
    /// Replay Attack
    pub replay: usize,
    /// Unknown CAN ID
    pub unknown: usize,
    /// Unexpected payload
    pub payload: usize,
    /// DoS suspected
    pub dos: usize,
    /// 분류되지 않은 알림
    pub other: usize,
    /// 심각도별 수
    pub by_severity: SeverityCounts,
}

impl AlertSummary {
    /// 알림 목록에서 집계를 만듭니다.
    pub fn from_records(records: &[AlertRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.record(record);
        }
        summary
    }

    /// 알림 한 건을 집계에 더합니다.
    pub fn record(&mut self, record: &AlertRecord) {
        self.total += 1;
        match record.alert_type {
            AlertType::ReplayAttack => self.replay += 1,
            AlertType::UnknownCanId => self.unknown += 1,
            AlertType::UnexpectedPayload => self.payload += 1,
            AlertType::DosSuspected => self.dos += 1,
            AlertType::Unknown => self.other += 1,
        }
        match record.severity() {
            Severity::Low => self.by_severity.low += 1,
            Severity::Medium => self.by_severity.medium += 1,
            Severity::High => self.by_severity.high += 1,
            Severity::Critical => self.by_severity.critical += 1,
        }
    }
}
