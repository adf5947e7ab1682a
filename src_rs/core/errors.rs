// 목적:
// - Rust 코어 계층의 표준 오류 타입을 정의한다.
//
// 설명:
// - 입력/설정/연결/검색 실행/직렬화 오류를 명시적으로 구분해 호출자에 전달한다.
// - 검색 실행 오류는 분류된 단일 메시지(NormalizedError)만 노출한다.
//
// 디자인 패턴:
// - 도메인 오류 열거형(Domain Error Enum).
//
// 참조:
// - src_rs/core/classify.rs
// - src_rs/core/search_pipeline.rs
// - src_rs/core/datastore.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 검색 실패가 어떤 분류 규칙으로 정규화되었는지 나타낸다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    ReadTimeout,
    StructuredTransport,
    UnstructuredTransport,
    Unclassified,
}

impl FailureCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadTimeout => "read_timeout",
            Self::StructuredTransport => "structured_transport",
            Self::UnstructuredTransport => "unstructured_transport",
            Self::Unclassified => "unclassified",
        }
    }
}

/// 검색 실행 실패 1건당 정확히 1개 생성되는 정규화 오류다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedError {
    pub category: FailureCategory,
    pub message: String,
}

impl NormalizedError {
    pub fn new(category: FailureCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// 코어 계층에서 공통으로 사용하는 오류 열거형이다.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("입력값이 유효하지 않습니다: {0}")]
    InvalidInput(String),
    #[error("설정값이 유효하지 않습니다: {0}")]
    InvalidConfig(String),
    #[error("검색 클러스터 연결에 실패했습니다: {0}")]
    Connection(String),
    #[error("{0}")]
    QueryExecution(NormalizedError),
    #[error("직렬화/역직렬화에 실패했습니다: {0}")]
    Serialization(String),
    #[error("런타임 처리 중 오류가 발생했습니다: {0}")]
    Runtime(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
