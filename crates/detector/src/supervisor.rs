//! 탐지기 프로세스 감독
//!
//! [`DetectorSupervisor`]는 외부 탐지기 프로세스를 최대 하나만 추적합니다.
//! 추적 슬롯은 비동기 뮤텍스로 보호되어 동시에 들어온 시작 요청 중
//! 하나만 성공합니다.
//!
//! # 종료 절차
//! 1. 자식이 이미 종료했으면 종료 코드만 회수합니다.
//! 2. SIGTERM을 보내고 `stop_timeout` 동안 기다립니다.
//! 3. 시간 초과나 에러가 나면 강제 종료(SIGKILL)합니다. 강제 종료 실패는
//!    로그만 남기고 삼킵니다.
//!
//! 어느 경로로 끝나든 추적 슬롯은 비워집니다. 2단계 대기 중에는 슬롯 잠금을
//! 짧게만 잡으므로 [`DetectorSupervisor::status`]가 막히지 않고, 슬롯은 차
//! 있으므로 새 시작 요청은 `AlreadyRunning`으로 거부됩니다.

use std::fmt;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use canwatch_core::metrics as m;

use crate::config::SupervisorConfig;
use crate::error::DetectorError;

/// 자식 출력 로그 타겟
const OUTPUT_TARGET: &str = "canwatch::detector";

/// 종료 대기 중 자식 상태를 확인하는 주기
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 실행할 탐지기 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorCommand {
    /// 실행 파일
    pub program: String,
    /// 인자
    pub args: Vec<String>,
}

impl DetectorCommand {
    /// 인자 없는 명령을 만듭니다.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// 인자를 하나 추가합니다.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `<interpreter> <script>` 형태의 명령을 만듭니다.
    pub fn script(interpreter: impl Into<String>, script: impl Into<String>) -> Self {
        Self::new(interpreter).arg(script)
    }
}

impl fmt::Display for DetectorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// 정상적으로 끝난 종료 처리 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// SIGTERM으로 종료됨 (종료 코드, 신호로 끝났으면 None)
    Terminated(Option<i32>),
    /// 종료 요청 전에 스스로 종료해 있었음
    AlreadyExited(Option<i32>),
}

impl StopOutcome {
    /// 종료 코드
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Terminated(code) | Self::AlreadyExited(code) => *code,
        }
    }
}

/// 탐지기 상태 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectorStatus {
    /// 추적 중이며 아직 살아 있음
    pub running: bool,
    /// 프로세스 ID
    pub pid: Option<u32>,
    /// 실행 명령
    pub command: Option<String>,
    /// 시작 시각 (UNIX epoch 초)
    pub started_at: Option<u64>,
    /// 시작 후 경과 시간 (초)
    pub uptime_secs: Option<u64>,
    /// 스스로 종료했을 때의 종료 코드
    pub exit_code: Option<i32>,
}

impl DetectorStatus {
    /// 추적 슬롯이 차 있는지 여부
    pub fn is_tracked(&self) -> bool {
        self.started_at.is_some()
    }

    /// 추적 중이지만 이미 종료한 상태인지 여부
    pub fn has_exited(&self) -> bool {
        self.is_tracked() && !self.running
    }
}

/// 추적 중인 자식 프로세스
struct TrackedDetector {
    child: Child,
    pid: u32,
    command: DetectorCommand,
    started_at: SystemTime,
    started: Instant,
    exited: Option<ExitStatus>,
}

impl TrackedDetector {
    /// 종료 여부를 갱신합니다. 처음 종료를 발견하면 실행 게이지를 내립니다.
    fn poll_exit(&mut self) -> Option<ExitStatus> {
        if self.exited.is_none() {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    tracing::debug!(pid = self.pid, exit_code = ?status.code(), "detector exit observed");
                    metrics::gauge!(m::DETECTOR_RUNNING).set(0.0);
                    self.exited = Some(status);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(pid = self.pid, error = %e, "failed to poll detector"),
            }
        }
        self.exited
    }

    fn status(&mut self) -> DetectorStatus {
        let exited = self.poll_exit();
        DetectorStatus {
            running: exited.is_none(),
            pid: Some(self.pid),
            command: Some(self.command.to_string()),
            started_at: Some(
                self.started_at
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default(),
            ),
            uptime_secs: Some(self.started.elapsed().as_secs()),
            exit_code: exited.and_then(|s| s.code()),
        }
    }
}

/// 외부 탐지기 프로세스 감독자
pub struct DetectorSupervisor {
    config: SupervisorConfig,
    tracked: Mutex<Option<TrackedDetector>>,
    /// 종료 절차 직렬화
    stopping: Mutex<()>,
}

impl DetectorSupervisor {
    /// 새 감독자를 생성합니다. 처음에는 추적 중인 프로세스가 없습니다.
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            tracked: Mutex::new(None),
            stopping: Mutex::new(()),
        }
    }

    /// 감독 설정
    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// 탐지기를 시작하고 PID를 반환합니다.
    ///
    /// 이미 추적 중인 프로세스가 있으면 (종료했더라도) `AlreadyRunning`을 반환합니다.
    pub async fn start(&self, command: DetectorCommand) -> Result<u32, DetectorError> {
        let mut slot = self.tracked.lock().await;
        if slot.is_some() {
            return Err(DetectorError::AlreadyRunning);
        }

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DetectorError::SpawnFailed {
                program: command.program.clone(),
                reason: e.to_string(),
            })?;

        let pid = child.id().ok_or_else(|| DetectorError::SpawnFailed {
            program: command.program.clone(),
            reason: "process exited before its pid could be read".to_owned(),
        })?;

        if let Some(stdout) = child.stdout.take() {
            drain_output(stdout, pid, "stdout");
        }
        if let Some(stderr) = child.stderr.take() {
            drain_output(stderr, pid, "stderr");
        }

        tracing::info!(pid, command = %command, "detector started");
        metrics::counter!(m::DETECTOR_STARTS_TOTAL).increment(1);
        metrics::gauge!(m::DETECTOR_RUNNING).set(1.0);

        *slot = Some(TrackedDetector {
            child,
            pid,
            command,
            started_at: SystemTime::now(),
            started: Instant::now(),
            exited: None,
        });

        Ok(pid)
    }

    /// 추적 중인 탐지기를 종료합니다.
    ///
    /// `NotRunning`을 제외한 모든 경로에서 추적 슬롯을 비웁니다.
    pub async fn stop(&self) -> Result<StopOutcome, DetectorError> {
        let _stopping = self.stopping.lock().await;

        let pid = {
            let mut slot = self.tracked.lock().await;
            let tracked = slot.as_mut().ok_or(DetectorError::NotRunning)?;
            let pid = tracked.pid;

            if let Some(status) = tracked.poll_exit() {
                *slot = None;
                metrics::gauge!(m::DETECTOR_RUNNING).set(0.0);
                tracing::info!(pid, exit_code = ?status.code(), "detector had already exited");
                record_stop("exited");
                return Ok(StopOutcome::AlreadyExited(status.code()));
            }

            if let Err(e) = terminate(&mut tracked.child) {
                tracing::warn!(pid, error = %e, "failed to send SIGTERM, killing detector");
                if let Some(mut tracked) = slot.take() {
                    force_kill(&mut tracked.child, pid).await;
                }
                metrics::gauge!(m::DETECTOR_RUNNING).set(0.0);
                record_stop("failed");
                return Err(DetectorError::TerminationFailed(e.to_string()));
            }
            pid
        };

        let exited = self.wait_for_exit(self.config.stop_timeout).await;

        let tracked = self.tracked.lock().await.take();
        metrics::gauge!(m::DETECTOR_RUNNING).set(0.0);
        // 슬롯은 이 함수만 비우며 `stopping`을 잡고 있다
        let Some(mut tracked) = tracked else {
            return Err(DetectorError::NotRunning);
        };

        match exited {
            Some(status) => {
                tracing::info!(pid, exit_code = ?status.code(), "detector terminated");
                record_stop("terminated");
                Ok(StopOutcome::Terminated(status.code()))
            }
            None => {
                tracing::warn!(
                    pid,
                    timeout_ms = self.config.stop_timeout.as_millis() as u64,
                    "detector ignored SIGTERM, killing"
                );
                force_kill(&mut tracked.child, pid).await;
                record_stop("killed");
                Err(DetectorError::TerminationTimeout {
                    pid,
                    timeout_secs: self.config.stop_timeout.as_secs_f64(),
                })
            }
        }
    }

    /// 슬롯 잠금을 확인할 때만 잡으면서 자식 종료를 기다립니다.
    async fn wait_for_exit(&self, timeout: Duration) -> Option<ExitStatus> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let exited = self
                .tracked
                .lock()
                .await
                .as_mut()
                .and_then(TrackedDetector::poll_exit);
            if exited.is_some() {
                return exited;
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(EXIT_POLL_INTERVAL).await;
        }
    }

    /// 현재 상태 스냅샷
    pub async fn status(&self) -> DetectorStatus {
        let mut slot = self.tracked.lock().await;
        slot.as_mut()
            .map(TrackedDetector::status)
            .unwrap_or_default()
    }

    /// 추적 중인 프로세스가 있는지 여부
    pub async fn is_tracked(&self) -> bool {
        self.tracked.lock().await.is_some()
    }
}

impl Default for DetectorSupervisor {
    fn default() -> Self {
        Self::new(SupervisorConfig::default())
    }
}

fn record_stop(result: &'static str) {
    metrics::counter!(m::DETECTOR_STOPS_TOTAL, m::LABEL_RESULT => result).increment(1);
}

/// SIGTERM을 보냅니다.
#[cfg(unix)]
fn terminate(child: &mut Child) -> std::io::Result<()> {
    let Some(pid) = child.id() else {
        // 이미 회수됨
        return Ok(());
    };
    let pid = libc::pid_t::try_from(pid)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    // SAFETY: kill(2)은 메모리를 건드리지 않으며 pid는 우리가 생성한 자식이다.
    let ret = unsafe { libc::kill(pid, libc::SIGTERM) };
    if ret == -1 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// 정상 종료 신호가 없는 플랫폼에서는 바로 강제 종료를 시작합니다.
#[cfg(not(unix))]
fn terminate(child: &mut Child) -> std::io::Result<()> {
    child.start_kill()
}

async fn force_kill(child: &mut Child, pid: u32) {
    if let Err(e) = child.kill().await {
        tracing::error!(pid, error = %e, "failed to kill detector");
    }
}

/// 자식 출력을 라인 단위로 읽어 로그로 남깁니다.
fn drain_output<R>(reader: R, pid: u32, stream: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end();
                    if stream == "stderr" {
                        tracing::warn!(target: OUTPUT_TARGET, pid, stream, "{line}");
                    } else {
                        tracing::info!(target: OUTPUT_TARGET, pid, stream, "{line}");
                    }
                }
                Err(e) => {
                    tracing::debug!(target: OUTPUT_TARGET, pid, stream, error = %e, "output closed");
                    break;
                }
            }
        }
    });
}
