// 목적:
// - 백엔드 실패 형태를 단일 NormalizedError로 분류한다.
//
// 설명:
// - 우선순위: 읽기 타임아웃 -> 구조화 전송 오류 -> 비구조화 전송 오류 -> 기타.
// - 입력 값만 보고 판단하는 순수 함수라서 같은 실패는 항상 같은 메시지가 된다.
//
// 디자인 패턴:
// - 순서가 고정된 규칙 테이블(Ordered Rule Dispatch).
//
// 참조:
// - src_rs/index/backend.rs
// - src_rs/core/search_pipeline.rs

use serde_json::Value;

use crate::core::errors::{FailureCategory, NormalizedError};
use crate::index::backend::{BackendFailure, TransportCause};

const UNCLASSIFIED_PREFIX: &str = "Unable to execute search query";

/// 백엔드 실패 1건을 정규화 오류 1건으로 변환한다.
pub fn classify(failure: &BackendFailure) -> NormalizedError {
    match failure {
        BackendFailure::ConnectionTimeout {
            cause: Some(TransportCause::ReadTimeout(message)),
            ..
        } => NormalizedError::new(FailureCategory::ReadTimeout, message.clone()),
        BackendFailure::ConnectionTimeout { message, cause, .. } => {
            let text = cause
                .as_ref()
                .map_or(message.as_str(), TransportCause::message);
            NormalizedError::new(FailureCategory::UnstructuredTransport, text)
        }
        BackendFailure::Transport { error, info, .. } => match info {
            Value::Object(_) => NormalizedError::new(
                FailureCategory::StructuredTransport,
                structured_message(error, info),
            ),
            _ => NormalizedError::new(
                FailureCategory::UnstructuredTransport,
                unstructured_message(error, info),
            ),
        },
        BackendFailure::Other(text) => NormalizedError::new(
            FailureCategory::Unclassified,
            format!("{}: {}", UNCLASSIFIED_PREFIX, text),
        ),
    }
}

fn structured_message(error_label: &str, info: &Value) -> String {
    let error = info.get("error");

    if let Some(first) = error
        .and_then(|error| error.get("root_cause"))
        .and_then(Value::as_array)
        .and_then(|causes| causes.first())
    {
        if let Some(message) = root_cause_message(first) {
            return message;
        }
    }

    if let Some(reason) = error
        .and_then(|error| error.get("reason"))
        .and_then(Value::as_str)
    {
        return reason.to_string();
    }

    if let Some(text) = error.and_then(Value::as_str) {
        return text.to_string();
    }

    if error_label.trim().is_empty() {
        info.to_string()
    } else {
        error_label.to_string()
    }
}

fn root_cause_message(cause: &Value) -> Option<String> {
    let kind = cause.get("type").and_then(Value::as_str);
    let reason = cause.get("reason").and_then(Value::as_str);

    match (kind, reason) {
        (Some(kind), Some(reason)) => Some(format!("[{}] {}", kind, reason)),
        (None, Some(reason)) => Some(reason.to_string()),
        (Some(kind), None) => Some(format!("[{}]", kind)),
        (None, None) => None,
    }
}

fn unstructured_message(error_label: &str, info: &Value) -> String {
    match info {
        Value::String(text) => text.clone(),
        Value::Null => error_label.to_string(),
        other => other.to_string(),
    }
}
