// 목적:
// - OpenSearch HTTP API 접근을 담당한다.
//
// 설명:
// - 루트 엔드포인트(info)와 `_search` 호출을 제공한다.
// - reqwest 오류와 HTTP 상태 오류를 BackendFailure 형태로 옮긴다.
// - 실패 분류 자체는 하지 않는다. 분류는 core 계층의 몫이다.
//
// 디자인 패턴:
// - 저장소 패턴(Repository Pattern) + 어댑터(Adapter).
//
// 참조:
// - src_rs/index/backend.rs
// - src_rs/core/datastore.rs

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;

use crate::core::errors::{CoreError, CoreResult};
use crate::index::backend::{
    BackendFailure, BackendResult, ClusterInfo, SearchBackend, TransportCause,
};
use crate::index::names::to_index_path;

const CONNECTION_ERROR: &str = "CONNECTION_ERROR";
const TIMEOUT: &str = "TIMEOUT";

pub struct OpenSearchRepository {
    client: Client,
    base_url: Url,
    credentials: Option<(String, String)>,
}

impl OpenSearchRepository {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scheme: &str,
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        verify_certs: bool,
        use_env_proxy: bool,
        timeout_ms: u64,
    ) -> CoreResult<Self> {
        if host.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "cluster.host는 비어 있을 수 없습니다".to_string(),
            ));
        }

        let base_url = Url::parse(&format!("{}://{}:{}/", scheme, host, port)).map_err(|error| {
            CoreError::InvalidConfig(format!("클러스터 URL 생성 실패: {}", error))
        })?;

        let host_matches = base_url
            .host_str()
            .is_some_and(|parsed| parsed.eq_ignore_ascii_case(host));
        if !host_matches || base_url.port_or_known_default() != Some(port) {
            return Err(CoreError::InvalidConfig(format!(
                "cluster.host/port가 URL과 일치하지 않습니다: host={}, port={}, url={}",
                host, port, base_url
            )));
        }

        let mut builder = Client::builder()
            .timeout(Duration::from_millis(timeout_ms.max(1)))
            .danger_accept_invalid_certs(!verify_certs);
        if !use_env_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|error| CoreError::Connection(format!("HTTP 클라이언트 생성 실패: {}", error)))?;

        let credentials = match (username, password) {
            (Some(user), Some(secret)) => Some((user.to_string(), secret.to_string())),
            _ => None,
        };

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.credentials.as_ref() {
            Some((user, secret)) => builder.basic_auth(user, Some(secret)),
            None => builder,
        }
    }

    fn search_url(&self, indices: &[String]) -> BackendResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendFailure::Other(format!("검색 URL을 만들 수 없습니다: {}", self.base_url)))?
            .pop_if_empty()
            .push(&to_index_path(indices))
            .push("_search");
        Ok(url)
    }

    fn map_request_error(&self, error: &reqwest::Error) -> BackendFailure {
        let url = error
            .url()
            .unwrap_or(&self.base_url)
            .to_string();

        if error.is_timeout() {
            let inner = innermost_message(error);
            let cause = if error.is_connect() {
                TransportCause::Other(inner)
            } else {
                TransportCause::ReadTimeout(inner)
            };
            return BackendFailure::ConnectionTimeout {
                url,
                message: TIMEOUT.to_string(),
                cause: Some(cause),
            };
        }

        BackendFailure::Transport {
            status: error.status().map(|status| status.as_u16()),
            error: CONNECTION_ERROR.to_string(),
            info: Value::String(error.to_string()),
        }
    }

    async fn read_json(&self, response: Response) -> BackendResult<Value> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| self.map_request_error(&error))?;

        if !status.is_success() {
            return Err(transport_failure(status, &body));
        }

        serde_json::from_str(&body).map_err(|error| {
            BackendFailure::Other(format!("응답 JSON 파싱 실패: {}, body={}", error, body))
        })
    }
}

#[async_trait]
impl SearchBackend for OpenSearchRepository {
    async fn info(&self) -> BackendResult<ClusterInfo> {
        tracing::debug!(url = %self.base_url, "cluster info 요청");

        let response = self
            .with_auth(self.client.get(self.base_url.clone()))
            .send()
            .await
            .map_err(|error| self.map_request_error(&error))?;

        let payload = self.read_json(response).await?;
        serde_json::from_value(payload)
            .map_err(|error| BackendFailure::Other(format!("cluster info 파싱 실패: {}", error)))
    }

    async fn search(&self, indices: &[String], body: &Value) -> BackendResult<Value> {
        let url = self.search_url(indices)?;
        tracing::debug!(url = %url, "search 요청");

        let response = self
            .with_auth(self.client.post(url).json(body))
            .send()
            .await
            .map_err(|error| self.map_request_error(&error))?;

        self.read_json(response).await
    }
}

fn transport_failure(status: StatusCode, body: &str) -> BackendFailure {
    let reason = status.canonical_reason().unwrap_or("Unknown Status");
    let info = if body.trim().is_empty() {
        Value::String(format!("{} {}", status.as_u16(), reason))
    } else {
        match serde_json::from_str::<Value>(body) {
            Ok(parsed @ Value::Object(_)) => parsed,
            _ => Value::String(body.to_string()),
        }
    };

    let error = info
        .get("error")
        .and_then(|error| {
            error
                .get("type")
                .and_then(Value::as_str)
                .or_else(|| error.as_str())
        })
        .unwrap_or(reason)
        .to_string();

    BackendFailure::Transport {
        status: Some(status.as_u16()),
        error,
        info,
    }
}

fn innermost_message(error: &(dyn StdError + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
