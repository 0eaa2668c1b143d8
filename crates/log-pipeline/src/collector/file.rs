//! 파일 기반 알림 로그 테일러
//!
//! 알림 로그 파일을 주기적으로 폴링하며 새로 추가된 바이트를 읽습니다.
//! `tail -f`와 유사한 동작을 비동기 방식으로 구현합니다.
//!
//! # 커서
//! - 바이트 오프셋 하나만 추적하며 테일러마다 0에서 시작합니다 (영속화 없음).
//! - 파일이 없으면 그 틱을 건너뜁니다.
//! - 파일이 커서보다 짧아지면 (truncation) 커서를 0으로 되돌립니다.
//!
//! # 라인 경계
//! 마지막 개행 이후의 조각은 다음 읽기까지 보관했다가 완성된 라인만 파싱합니다.
//! 조각이 `max_line_length`를 넘으면 버리고, 다음 개행까지의 나머지도 버립니다.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use canwatch_core::metrics as m;
use canwatch_core::types::AlertRecord;

use super::CollectorStatus;
use crate::config::TailerConfig;
use crate::error::LogPipelineError;
use crate::parser::AlertLineParser;

/// 파일 기반 알림 로그 테일러
///
/// [`spawn`](Self::spawn)으로 백그라운드 태스크를 시작하고 반환된
/// [`TailerHandle`]로 중지합니다.
pub struct LogTailer {
    /// 테일러 설정
    config: TailerConfig,
    /// 라인 파서
    parser: AlertLineParser,
    /// 다음 읽기 위치 (바이트 오프셋)
    cursor: Arc<AtomicU64>,
    /// 아직 개행을 만나지 못한 조각
    pending: BytesMut,
    /// 너무 긴 라인의 나머지를 버리는 중
    discarding: bool,
    /// 새 알림 전송 채널 (수신 측이 닫히면 None)
    alert_tx: Option<mpsc::Sender<AlertRecord>>,
}

impl LogTailer {
    /// 새 테일러를 생성합니다. 커서는 0에서 시작합니다.
    pub fn new(config: TailerConfig, alert_tx: Option<mpsc::Sender<AlertRecord>>) -> Self {
        Self {
            config,
            parser: AlertLineParser::new(),
            cursor: Arc::new(AtomicU64::new(0)),
            pending: BytesMut::new(),
            discarding: false,
            alert_tx,
        }
    }

    /// 현재 커서 위치
    pub fn offset(&self) -> u64 {
        self.cursor.load(Ordering::Acquire)
    }

    /// 폴링 루프를 별도 태스크에서 시작합니다.
    pub fn spawn(self) -> TailerHandle {
        let cancel = CancellationToken::new();
        let cursor = Arc::clone(&self.cursor);
        let path = self.config.path.clone();
        let task = tokio::spawn(self.run(cancel.clone()));

        TailerHandle {
            path,
            cursor,
            cancel,
            task,
        }
    }

    async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(
            path = %self.config.path.display(),
            interval_ms = self.config.poll_interval.as_millis() as u64,
            "alert log tailer started"
        );

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(e) = self.poll_once().await {
                        tracing::warn!(
                            path = %self.config.path.display(),
                            error = %e,
                            "alert log poll failed"
                        );
                    }
                }
            }
        }

        tracing::info!(
            path = %self.config.path.display(),
            offset = self.offset(),
            "alert log tailer stopped"
        );
    }

    /// 한 번 폴링합니다. 새로 읽은 바이트 수를 반환합니다.
    pub async fn poll_once(&mut self) -> Result<usize, LogPipelineError> {
        let path = self.config.path.as_path();
        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(collector_error(path, &e)),
        };

        let len = file
            .metadata()
            .await
            .map_err(|e| collector_error(path, &e))?
            .len();

        let mut offset = self.offset();
        if len < offset {
            tracing::warn!(
                path = %path.display(),
                offset,
                len,
                "alert log shrank, rewinding cursor"
            );
            metrics::counter!(m::TAILER_TRUNCATIONS_TOTAL).increment(1);
            offset = 0;
            self.pending.clear();
            self.discarding = false;
        }

        file.seek(SeekFrom::Start(offset))
            .await
            .map_err(|e| collector_error(path, &e))?;

        let mut buf = Vec::new();
        let read = file
            .read_to_end(&mut buf)
            .await
            .map_err(|e| collector_error(path, &e))?;

        self.cursor.store(offset + read as u64, Ordering::Release);
        if read == 0 {
            return Ok(0);
        }

        tracing::debug!(
            path = %path.display(),
            bytes = read,
            content = %String::from_utf8_lossy(&buf),
            "new alert log content"
        );
        metrics::counter!(m::TAILER_BYTES_READ_TOTAL).increment(read as u64);

        self.pending.extend_from_slice(&buf);
        self.drain_complete_lines();

        Ok(read)
    }

    fn drain_complete_lines(&mut self) {
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line = self.pending.split_to(pos + 1);
            if std::mem::take(&mut self.discarding) {
                continue;
            }
            if line.len() > self.config.max_line_length {
                self.skip_oversized(line.len());
                continue;
            }
            let text = String::from_utf8_lossy(&line);
            if text.trim().is_empty() {
                continue;
            }
            match self.parser.parse_line(&text) {
                Ok(alert) => self.emit(alert),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed alert line");
                    metrics::counter!(m::ALERT_LINES_SKIPPED_TOTAL).increment(1);
                }
            }
        }

        if self.pending.len() > self.config.max_line_length {
            if !self.discarding {
                self.skip_oversized(self.pending.len());
            }
            self.pending.clear();
            self.discarding = true;
        }
    }

    fn skip_oversized(&self, len: usize) {
        tracing::warn!(
            path = %self.config.path.display(),
            len,
            max = self.config.max_line_length,
            "alert line exceeds max length, discarding"
        );
        metrics::counter!(m::ALERT_LINES_SKIPPED_TOTAL).increment(1);
    }

    fn emit(&mut self, alert: AlertRecord) {
        metrics::counter!(m::TAILER_ALERTS_TOTAL, m::LABEL_ALERT_TYPE => alert.alert_type.label())
            .increment(1);

        let Some(tx) = &self.alert_tx else {
            return;
        };

        match tx.try_send(alert) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(
                    alert_type = %dropped.alert_type,
                    can_id = %dropped.can_id,
                    "alert channel full, dropping live alert"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("alert receiver closed, live alerts disabled");
                self.alert_tx = None;
            }
        }
    }
}

fn collector_error(path: &Path, err: &std::io::Error) -> LogPipelineError {
    LogPipelineError::Collector {
        source_type: format!("file:{}", path.display()),
        reason: err.to_string(),
    }
}

/// 실행 중인 테일러 핸들
///
/// 핸들을 drop해도 태스크는 멈추지 않습니다. [`stop`](Self::stop)을 호출하세요.
#[derive(Debug)]
pub struct TailerHandle {
    path: PathBuf,
    cursor: Arc<AtomicU64>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl TailerHandle {
    /// 폴링 중지를 요청합니다. 루프는 다음 틱 이전에 종료됩니다.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// 감시 중인 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 현재 커서 위치
    pub fn offset(&self) -> u64 {
        self.cursor.load(Ordering::Acquire)
    }

    /// 현재 상태
    pub fn status(&self) -> CollectorStatus {
        if self.task.is_finished() {
            CollectorStatus::Stopped
        } else {
            CollectorStatus::Running
        }
    }

    /// 태스크 종료를 기다립니다.
    pub async fn join(self) -> Result<(), LogPipelineError> {
        self.task
            .await
            .map_err(|e| LogPipelineError::Channel(format!("tailer task failed: {e}")))
    }
}
