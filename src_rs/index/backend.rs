// 목적:
// - 검색 백엔드 클라이언트가 제공해야 하는 기능 경계를 정의한다.
//
// 설명:
// - info 호출(버전 메타데이터)과 search 호출 두 가지만 요구한다.
// - 백엔드가 던질 수 있는 실패 형태를 BackendFailure로 고정한다.
//
// 디자인 패턴:
// - 어댑터(Adapter) 트레이트.
//
// 참조:
// - src_rs/index/opensearch_repo.rs
// - src_rs/core/classify.rs

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// 타임아웃 예외가 감싸고 있는 하위 원인이다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCause {
    ReadTimeout(String),
    Other(String),
}

impl TransportCause {
    pub fn message(&self) -> &str {
        match self {
            Self::ReadTimeout(message) | Self::Other(message) => message,
        }
    }
}

/// 백엔드 클라이언트가 반환하는 실패 형태다.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendFailure {
    ConnectionTimeout {
        url: String,
        message: String,
        cause: Option<TransportCause>,
    },
    Transport {
        status: Option<u16>,
        error: String,
        info: Value,
    },
    Other(String),
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionTimeout { url, message, cause } => match cause {
                Some(cause) => {
                    write!(f, "ConnectionTimeout({url}, {message}, {})", cause.message())
                }
                None => write!(f, "ConnectionTimeout({url}, {message})"),
            },
            Self::Transport { status, error, info } => {
                let status = status.map_or_else(|| "N/A".to_string(), |code| code.to_string());
                write!(f, "TransportError({status}, {error}, {info})")
            }
            Self::Other(message) => f.write_str(message),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendFailure>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub distribution: Option<String>,
}

/// 클러스터 루트 엔드포인트가 돌려주는 메타데이터다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub version: VersionInfo,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn info(&self) -> BackendResult<ClusterInfo>;
    async fn search(&self, indices: &[String], body: &Value) -> BackendResult<Value>;
}
