//! 알림 로그 저장소
//!
//! 탐지기가 추가 기록하는 단일 텍스트 파일입니다. 이 크레이트는 파일을 쓰지
//! 않으며, 탐지 시작 전에 빈 파일을 만들어 두고 조회 시 전체를 다시 읽습니다.

use std::path::{Path, PathBuf};

use canwatch_core::config::AlertLogConfig;
use canwatch_core::types::AlertRecord;

use crate::error::LogPipelineError;
use crate::parser::{AlertLineParser, parse_all_with};

/// 알림 로그 파일 핸들
#[derive(Debug, Clone)]
pub struct AlertLog {
    path: PathBuf,
    parser: AlertLineParser,
}

impl AlertLog {
    /// 경로로 알림 로그를 지정합니다. 파일은 만들지 않습니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            parser: AlertLineParser::new(),
        }
    }

    /// core 설정에서 생성합니다.
    pub fn from_core(core: &AlertLogConfig) -> Self {
        Self::new(&core.path)
    }

    /// 알림 로그 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 파일이 없으면 빈 파일을 만듭니다. 기존 내용은 유지합니다.
    ///
    /// 새로 만들었으면 `true`를 반환합니다.
    pub async fn ensure_exists(&self) -> Result<bool, LogPipelineError> {
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_error(e))?
        {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }

        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::info!(path = %self.path.display(), "created empty alert log");
        Ok(true)
    }

    /// 파일 전체를 읽어 알림 목록으로 파싱합니다.
    ///
    /// 파일이 없으면 빈 목록을 반환합니다. UTF-8이 아닌 바이트는 대체 문자로
    /// 바꿔 읽습니다.
    pub async fn read_all(&self) -> Result<Vec<AlertRecord>, LogPipelineError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let text = String::from_utf8_lossy(&raw);
        Ok(parse_all_with(&self.parser, &text))
    }

    fn io_error(&self, source: std::io::Error) -> LogPipelineError {
        LogPipelineError::AlertLog {
            path: self.path.display().to_string(),
            source,
        }
    }
}
