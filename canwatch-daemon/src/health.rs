//! Aggregated health reporting for `GET /health`.
//!
//! The daemon reports one entry per component (detector, alert tailer)
//! and an overall status that is the worst of them.
//!
//! # Aggregation Rule
//!
//! - All Healthy -> Healthy
//! - Any Degraded, none Unhealthy -> Degraded(reason)
//! - Any Unhealthy -> Unhealthy(reason)

use std::time::Instant;

use serde::Serialize;

use canwatch_core::pipeline::HealthStatus;
use canwatch_detector::DetectorStatus;
use canwatch_log_pipeline::CollectorStatus;

use crate::controller::DetectionController;

/// Detector lifecycle as seen by the health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorState {
    /// No detector tracked.
    Idle,
    /// Tracked and alive.
    Running,
    /// Tracked but ended on its own.
    Exited,
}

impl DetectorState {
    /// Classify a detector status snapshot.
    pub fn from_status(status: &DetectorStatus) -> Self {
        if status.running {
            Self::Running
        } else if status.has_exited() {
            Self::Exited
        } else {
            Self::Idle
        }
    }
}

/// Aggregated health report for the entire daemon.
#[derive(Debug, Clone, Serialize)]
pub struct DaemonHealth {
    /// Overall daemon health status (worst of all components).
    pub status: HealthStatus,
    /// Daemon uptime in seconds since start.
    pub uptime_secs: u64,
    /// Detector lifecycle state.
    pub detector: DetectorState,
    /// Per-component health reports.
    pub components: Vec<ComponentHealth>,
}

/// Health status for a single component.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    /// Component name (`detector`, `alert-tailer`).
    pub name: String,
    /// Current health status of the component.
    pub status: HealthStatus,
}

impl ComponentHealth {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_owned(),
            status,
        }
    }
}

/// Aggregate component health statuses into a single status.
///
/// Returns the worst status found: Unhealthy > Degraded > Healthy.
pub fn aggregate_status(components: &[ComponentHealth]) -> HealthStatus {
    let mut unhealthy = Vec::new();
    let mut degraded = Vec::new();

    for component in components {
        match &component.status {
            HealthStatus::Healthy => {}
            HealthStatus::Degraded(reason) => {
                degraded.push(format!("{}: {}", component.name, reason));
            }
            HealthStatus::Unhealthy(reason) => {
                unhealthy.push(format!("{}: {}", component.name, reason));
            }
        }
    }

    if !unhealthy.is_empty() {
        HealthStatus::Unhealthy(unhealthy.join("; "))
    } else if !degraded.is_empty() {
        HealthStatus::Degraded(degraded.join("; "))
    } else {
        HealthStatus::Healthy
    }
}

/// Health of the detector component.
pub fn detector_health(status: &DetectorStatus) -> HealthStatus {
    match DetectorState::from_status(status) {
        DetectorState::Exited => HealthStatus::Degraded(match status.exit_code {
            Some(code) => format!("detector exited unexpectedly with code {code}"),
            None => "detector exited unexpectedly".to_owned(),
        }),
        DetectorState::Running | DetectorState::Idle => HealthStatus::Healthy,
    }
}

/// Health of the tailer component.
///
/// A tailer that finished while a detector is tracked stopped on its own.
pub fn tailer_health(tailer: CollectorStatus, detector: DetectorState) -> HealthStatus {
    match (tailer, detector) {
        (CollectorStatus::Stopped, DetectorState::Running | DetectorState::Exited) => {
            HealthStatus::Unhealthy("alert tailer stopped while detection is active".to_owned())
        }
        _ => HealthStatus::Healthy,
    }
}

/// Build the full health report.
pub async fn check(controller: &DetectionController, started: Instant) -> DaemonHealth {
    let detector_status = controller.detector_status().await;
    let detector = DetectorState::from_status(&detector_status);
    let tailer = controller.tailer_status().await;

    let components = vec![
        ComponentHealth::new("detector", detector_health(&detector_status)),
        ComponentHealth::new("alert-tailer", tailer_health(tailer, detector)),
    ];

    DaemonHealth {
        status: aggregate_status(&components),
        uptime_secs: started.elapsed().as_secs(),
        detector,
        components,
    }
}
