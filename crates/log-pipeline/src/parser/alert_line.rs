//! `[<timestamp>] [ALERT] <message>` 라인 파서
//!
//! 라인을 공백 기준으로 최대 3개 필드로 나눕니다.
//!
//! | 필드 | 내용 |
//! |---|---|
//! | 0 | 대괄호로 감싼 타임스탬프 (앞뒤 `[`/`]` 제거) |
//! | 1 | 태그 (`[ALERT]`, 검증하지 않음) |
//! | 2 | 나머지 전체 = 메시지 |
//!
//! 알림 종류는 메시지 부분 문자열로 판별하고, CAN ID는 메시지의 첫 `"ID "`
//! 다음 토큰에서 뒤쪽 `:`를 떼어 얻습니다.

use canwatch_core::error::{CanwatchError, ParseError};
use canwatch_core::pipeline::LogParser;
use canwatch_core::types::{AlertRecord, AlertType, UNKNOWN_CAN_ID};

/// 필드 개수 (timestamp, tag, message)
const FIELD_COUNT: usize = 3;

/// CAN ID 앞에 오는 표식
const CAN_ID_MARKER: &str = "ID ";

/// 탐지기 알림 라인 파서
///
/// 상태가 없으며 같은 입력에 항상 같은 결과를 냅니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertLineParser;

impl AlertLineParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 한 라인을 파싱합니다. 형식이 맞지 않으면 [`ParseError`]를 반환합니다.
    pub fn parse_line(&self, line: &str) -> Result<AlertRecord, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        let (timestamp, _tag, message) = split_fields(line)?;

        Ok(AlertRecord {
            timestamp: timestamp.trim_matches(['[', ']']).to_owned(),
            alert_type: AlertType::classify(message),
            message: message.to_owned(),
            can_id: extract_can_id(message),
        })
    }
}

impl LogParser for AlertLineParser {
    fn format_name(&self) -> &str {
        "ids-alert"
    }

    fn parse(&self, line: &str) -> Result<AlertRecord, CanwatchError> {
        self.parse_line(line).map_err(CanwatchError::from)
    }
}

/// 앞의 두 토큰과 나머지 메시지로 나눕니다.
fn split_fields(line: &str) -> Result<(&str, &str, &str), ParseError> {
    let mut rest = line;
    let mut heads = [""; FIELD_COUNT - 1];

    for (found, slot) in heads.iter_mut().enumerate() {
        match rest.split_once(char::is_whitespace) {
            Some((head, tail)) => {
                *slot = head;
                rest = tail.trim_start();
            }
            None => {
                return Err(ParseError::MissingFields {
                    expected: FIELD_COUNT,
                    found: found + 1,
                });
            }
        }
    }

    Ok((heads[0], heads[1], rest))
}

/// 메시지에서 CAN ID를 추출합니다.
///
/// `"ID "`가 있으면 바로 뒤 토큰을 그대로 씁니다. 토큰이 비어 있어도
/// (`"ID : x"`, `"ID  0x1"`) `"Unknown"`으로 바꾸지 않습니다.
fn extract_can_id(message: &str) -> String {
    message
        .split_once(CAN_ID_MARKER)
        .and_then(|(_, after)| after.split(char::is_whitespace).next())
        .map_or(UNKNOWN_CAN_ID, |token| token.trim_matches(':'))
        .to_owned()
}
