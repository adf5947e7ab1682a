// 목적:
// - 검색 클러스터 연결을 만들고 서버 버전을 한 번 확정한다.
//
// 설명:
// - 클라이언트 생성 -> info 호출 -> version.number 파싱 순서로 처리한다.
// - 어느 단계든 실패하면 부분 초기화된 핸들 없이 Connection 오류로 끝낸다.
// - 생성 이후 핸들은 읽기 전용이며 여러 검색 실행이 공유한다.
//
// 디자인 패턴:
// - 파사드(Facade) + 실패 빠르게(Fail Fast).
//
// 참조:
// - src_rs/index/opensearch_repo.rs
// - src_rs/core/search_pipeline.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::core::errors::{CoreError, CoreResult};
use crate::core::query_dsl::QueryFilter;
use crate::core::search_pipeline::{execute_search, SearchRequest};
use crate::index::backend::SearchBackend;
use crate::index::opensearch_repo::OpenSearchRepository;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfigPayload {
    pub host: String,
    pub port: u16,
    pub scheme: Scheme,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_certs: bool,
    pub use_env_proxy: bool,
    pub timeout_ms: u64,
}

impl Default for ClusterConfigPayload {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9200,
            scheme: Scheme::Http,
            username: None,
            password: None,
            verify_certs: true,
            use_env_proxy: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClusterConfigPayload {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.host.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "cluster.host는 비어 있을 수 없습니다".to_string(),
            ));
        }

        if !is_bare_host(&self.host) {
            return Err(CoreError::InvalidConfig(format!(
                "cluster.host에는 스킴/경로/포트 없이 호스트 이름만 지정해야 합니다: {}",
                self.host
            )));
        }

        if self.port == 0 {
            return Err(CoreError::InvalidConfig(
                "cluster.port는 1 이상이어야 합니다".to_string(),
            ));
        }

        if self.timeout_ms == 0 {
            return Err(CoreError::InvalidConfig(
                "cluster.timeout_ms는 1 이상이어야 합니다".to_string(),
            ));
        }

        if self.username.is_some() != self.password.is_some() {
            return Err(CoreError::InvalidConfig(
                "cluster.username과 cluster.password는 함께 지정해야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

// `[::1]` 형태의 IPv6 리터럴만 콜론을 허용한다.
fn is_bare_host(host: &str) -> bool {
    if host.starts_with('[') && host.ends_with(']') {
        return host.len() > 2
            && host[1..host.len() - 1]
                .chars()
                .all(|ch| ch.is_ascii_hexdigit() || ch == ':' || ch == '.');
    }

    host.chars()
        .all(|ch| !ch.is_whitespace() && !matches!(ch, '/' | ':' | '@' | '?' | '#' | '[' | ']'))
}

/// 클러스터가 보고한 서버 버전이다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerVersion {
    pub raw: String,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub distribution: Option<String>,
}

impl ServerVersion {
    pub fn parse(raw: &str, distribution: Option<String>) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("서버 버전이 비어 있습니다".to_string());
        }

        // 7.0.0-beta1, 7.0.0+build 형태는 숫자 부분만 본다.
        let numeric = trimmed
            .trim_start_matches('v')
            .split(['-', '+'])
            .next()
            .unwrap_or_default();

        let mut parts = numeric.split('.');
        let major = parse_component(parts.next(), trimmed, true)?;
        let minor = parse_component(parts.next(), trimmed, false)?;
        let patch = parse_component(parts.next(), trimmed, false)?;

        Ok(Self {
            raw: trimmed.to_string(),
            major,
            minor,
            patch,
            distribution,
        })
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_component(part: Option<&str>, raw: &str, required: bool) -> Result<u32, String> {
    match part {
        Some(value) if !value.is_empty() => value
            .parse::<u32>()
            .map_err(|_| format!("서버 버전 형식이 올바르지 않습니다: {}", raw)),
        _ if required => Err(format!("서버 버전 형식이 올바르지 않습니다: {}", raw)),
        _ => Ok(0),
    }
}

/// 클러스터 핸들: 백엔드 클라이언트와 확정된 서버 버전을 함께 보관한다.
#[derive(Clone)]
pub struct OpenSearchDataStore {
    backend: Arc<dyn SearchBackend>,
    version: ServerVersion,
}

impl fmt::Debug for OpenSearchDataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenSearchDataStore")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl OpenSearchDataStore {
    /// 설정값으로 HTTP 백엔드를 만들고 부트스트랩한다.
    pub async fn connect(config: &ClusterConfigPayload) -> CoreResult<Self> {
        config.validate()?;

        let repository = OpenSearchRepository::new(
            config.scheme.as_str(),
            &config.host,
            config.port,
            config.username.as_deref(),
            config.password.as_deref(),
            config.verify_certs,
            config.use_env_proxy,
            config.timeout_ms,
        )?;
        tracing::info!(url = %repository.base_url(), "검색 클러스터 연결 시작");

        Self::with_backend(Arc::new(repository)).await
    }

    /// 이미 만들어진 백엔드로 info 호출을 수행하고 버전을 확정한다.
    pub async fn with_backend(backend: Arc<dyn SearchBackend>) -> CoreResult<Self> {
        let info = backend.info().await.map_err(|failure| {
            tracing::error!(error = %failure, "cluster info 호출 실패");
            CoreError::Connection(failure.to_string())
        })?;

        let version = ServerVersion::parse(&info.version.number, info.version.distribution)
            .map_err(CoreError::Connection)?;

        tracing::info!(
            version = %version,
            node = info.name.as_deref().unwrap_or("unknown"),
            cluster = info.cluster_name.as_deref().unwrap_or("unknown"),
            "검색 클러스터 버전 확인"
        );

        Ok(Self { backend, version })
    }

    pub fn server_version(&self) -> &ServerVersion {
        &self.version
    }

    /// 검색 요청 1건을 실행한다.
    pub async fn execute(&self, request: &SearchRequest) -> CoreResult<Value> {
        execute_search(self.backend.as_ref(), &self.version, request).await
    }

    /// 개별 인자로 검색을 실행한다.
    pub async fn search(
        &self,
        sketch_id: u64,
        indices: &[String],
        query_string: &str,
        query_filter: Option<QueryFilter>,
    ) -> CoreResult<Value> {
        let request = SearchRequest {
            sketch_id,
            indices: indices.to_vec(),
            query_string: query_string.to_string(),
            query_filter,
        };
        self.execute(&request).await
    }
}
