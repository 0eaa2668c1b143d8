//! Detection control -- composes the detector supervisor, the alert log
//! tailer and the alert log store behind one owned object.
//!
//! The [`DetectionController`] is the only place that changes detection
//! state. A transition mutex serializes start/stop so the tracked detector
//! process and the tailer always change together. The run state has its own
//! lock, held only for short updates, so `/status` and `/health` answer
//! while a stop waits out the detector's grace period. The tailer's polling
//! loop runs on its own task, outside both locks.
//!
//! # Start
//!
//! 1. Reject if a detector is already tracked
//! 2. Create the alert log if missing
//! 3. Spawn `<interpreter> <script_path>`
//! 4. Start tailing the configured alert log from offset 0
//!
//! # Stop
//!
//! The supervisor clears its slot on every path except `NotRunning`, and
//! the tailer is stopped on all of those paths too, including failures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, mpsc};

use canwatch_core::config::{CanwatchConfig, DetectorConfig};
use canwatch_core::types::AlertRecord;
use canwatch_detector::{
    DetectorCommand, DetectorError, DetectorStatus, DetectorSupervisor, StopOutcome,
    SupervisorConfig,
};
use canwatch_log_pipeline::{
    AlertLog, AlertSummary, CollectorStatus, LogPipelineError, LogTailer, TailerConfig,
    TailerHandle,
};

/// Errors surfaced by controller operations.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Detector lifecycle failure.
    #[error(transparent)]
    Detector(#[from] DetectorError),

    /// Alert log access failure.
    #[error(transparent)]
    AlertLog(#[from] LogPipelineError),
}

impl ControllerError {
    /// Whether the caller asked for an invalid state transition.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Detector(e) if e.is_client_error())
    }
}

/// Body of a start request. Missing fields fall back to configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StartRequest {
    /// Detector script to run.
    pub script_path: Option<String>,
    /// CAN input log for the detector.
    ///
    /// Recorded for status only. The detector is launched with just the
    /// script, and alerts are always read from the configured alert log.
    pub log_file: Option<String>,
}

/// Snapshot returned by `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionStatus {
    /// A tracked detector is alive.
    pub running: bool,
    /// Detector PID when tracked.
    pub pid: Option<u32>,
    /// Script of the current run.
    pub script_path: Option<String>,
    /// Input log requested for the current run.
    pub input_log: Option<String>,
    /// Alert log being tailed and served.
    pub alert_log: String,
    /// Tailer cursor in bytes, when tailing.
    pub tail_offset: Option<u64>,
    /// Seconds since the detector started.
    pub uptime_secs: Option<u64>,
    /// Exit code when the detector ended on its own.
    pub exit_code: Option<i32>,
}

/// Parameters of the active run.
#[derive(Debug, Clone)]
struct ActiveRun {
    script_path: String,
    input_log: String,
}

#[derive(Default)]
struct ControllerState {
    tailer: Option<TailerHandle>,
    run: Option<ActiveRun>,
}

/// Single owner of detection state.
pub struct DetectionController {
    detector: DetectorConfig,
    tailer_config: TailerConfig,
    alert_log: AlertLog,
    supervisor: DetectorSupervisor,
    alert_tx: mpsc::Sender<AlertRecord>,
    transition: Mutex<()>,
    state: Mutex<ControllerState>,
}

impl DetectionController {
    /// Build a controller from configuration.
    ///
    /// Returns the controller and the receiving end of the live alert channel.
    pub fn new(config: &CanwatchConfig) -> (Self, mpsc::Receiver<AlertRecord>) {
        let tailer_config = TailerConfig::from_core(&config.alert_log);
        Self::with_tailer_config(config, tailer_config)
    }

    /// Build a controller with an explicit tailer configuration.
    pub fn with_tailer_config(
        config: &CanwatchConfig,
        tailer_config: TailerConfig,
    ) -> (Self, mpsc::Receiver<AlertRecord>) {
        let (alert_tx, alert_rx) = mpsc::channel(tailer_config.channel_capacity.max(1));
        let controller = Self {
            detector: config.detector.clone(),
            alert_log: AlertLog::new(tailer_config.path.clone()),
            tailer_config,
            supervisor: DetectorSupervisor::new(SupervisorConfig::from_core(&config.detector)),
            alert_tx,
            transition: Mutex::new(()),
            state: Mutex::new(ControllerState::default()),
        };
        (controller, alert_rx)
    }

    /// Path of the alert log.
    pub fn alert_log_path(&self) -> PathBuf {
        self.alert_log.path().to_path_buf()
    }

    /// Start the detector and the alert log tailer.
    pub async fn start(&self, request: StartRequest) -> Result<u32, ControllerError> {
        let _transition = self.transition.lock().await;
        if self.supervisor.is_tracked().await {
            return Err(DetectorError::AlreadyRunning.into());
        }

        let script_path = request
            .script_path
            .unwrap_or_else(|| self.detector.default_script.clone());
        let input_log = request
            .log_file
            .unwrap_or_else(|| self.detector.default_input_log.clone());

        self.alert_log.ensure_exists().await?;

        let command = DetectorCommand::script(&self.detector.interpreter, &script_path);
        let pid = self.supervisor.start(command).await?;

        let mut state = self.state.lock().await;
        if let Some(stale) = state.tailer.take() {
            stale.stop();
        }
        let tailer = LogTailer::new(self.tailer_config.clone(), Some(self.alert_tx.clone()));
        state.tailer = Some(tailer.spawn());
        state.run = Some(ActiveRun {
            script_path: script_path.clone(),
            input_log: input_log.clone(),
        });

        tracing::info!(
            pid,
            script_path = %script_path,
            input_log = %input_log,
            alert_log = %self.alert_log.path().display(),
            "detection started"
        );
        Ok(pid)
    }

    /// Stop the detector and the tailer.
    pub async fn stop(&self) -> Result<StopOutcome, ControllerError> {
        let _transition = self.transition.lock().await;
        let result = self.supervisor.stop().await;

        if !matches!(result, Err(DetectorError::NotRunning)) {
            let mut state = self.state.lock().await;
            if let Some(tailer) = state.tailer.take() {
                tailer.stop();
            }
            state.run = None;
        }

        match &result {
            Ok(outcome) => tracing::info!(
                exit_code = ?outcome.exit_code(),
                "detection stopped"
            ),
            Err(DetectorError::NotRunning) => {}
            Err(e) => tracing::error!(error = %e, "detection stopped with errors"),
        }

        result.map_err(ControllerError::from)
    }

    /// Re-read and parse the whole alert log.
    pub async fn alerts(&self) -> Result<Vec<AlertRecord>, ControllerError> {
        Ok(self.alert_log.read_all().await?)
    }

    /// Per-type and per-severity counts over the whole alert log.
    pub async fn alert_stats(&self) -> Result<AlertSummary, ControllerError> {
        let alerts = self.alerts().await?;
        Ok(AlertSummary::from_records(&alerts))
    }

    /// Current detector status.
    pub async fn detector_status(&self) -> DetectorStatus {
        self.supervisor.status().await
    }

    /// Tailer state: `Idle` when no run is active.
    pub async fn tailer_status(&self) -> CollectorStatus {
        let state = self.state.lock().await;
        state
            .tailer
            .as_ref()
            .map(TailerHandle::status)
            .unwrap_or(CollectorStatus::Idle)
    }

    /// Snapshot for the dashboard status banner.
    pub async fn status(&self) -> DetectionStatus {
        let state = self.state.lock().await;
        let detector = self.supervisor.status().await;
        let run = state.run.clone();

        DetectionStatus {
            running: detector.running,
            pid: detector.pid,
            script_path: run.as_ref().map(|r| r.script_path.clone()),
            input_log: run.map(|r| r.input_log),
            alert_log: self.alert_log.path().display().to_string(),
            tail_offset: state.tailer.as_ref().map(TailerHandle::offset),
            uptime_secs: detector.uptime_secs,
            exit_code: detector.exit_code,
        }
    }

    /// Stop any running detection before the daemon exits.
    pub async fn shutdown(&self) {
        match self.stop().await {
            Ok(_) => tracing::info!("detection stopped for shutdown"),
            Err(ControllerError::Detector(DetectorError::NotRunning)) => {}
            Err(e) => tracing::warn!(error = %e, "detection did not stop cleanly on shutdown"),
        }
    }
}
