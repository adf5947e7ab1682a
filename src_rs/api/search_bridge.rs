// 목적:
// - Python에서 호출 가능한 OpenSearchDataStore 클래스를 제공한다.
//
// 설명:
// - 생성 시 클러스터에 연결해 서버 버전을 확정한다.
// - 검색 실패는 ValueError, 연결 실패는 ConnectionError로 Python에 전달한다.
// - 결과는 백엔드 응답 JSON 문자열 그대로 반환한다.
//
// 디자인 패턴:
// - 파사드(Facade) + 실패 빠르게(Fail Fast).
//
// 참조:
// - src_rs/core/datastore.rs
// - src_rs/core/search_pipeline.rs

use pyo3::exceptions::{PyConnectionError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::sync::Once;
use tokio::runtime::{Builder, Runtime};
use tracing_subscriber::EnvFilter;

use crate::core::datastore::{ClusterConfigPayload, OpenSearchDataStore};
use crate::core::errors::{CoreError, CoreResult};
use crate::core::query_dsl::QueryFilter;

static TRACING_INIT: Once = Once::new();

/// Python에 노출되는 검색 데이터스토어 클래스다.
#[pyclass(name = "OpenSearchDataStore")]
pub struct PyOpenSearchDataStore {
    runtime: Runtime,
    datastore: OpenSearchDataStore,
}

#[pymethods]
impl PyOpenSearchDataStore {
    /// 클러스터에 연결하고 서버 버전을 확인한다.
    #[new]
    #[pyo3(signature = (host, port, config_json=None))]
    pub fn new(py: Python<'_>, host: String, port: u16, config_json: Option<&str>) -> PyResult<Self> {
        init_tracing();

        let mut config = match config_json {
            Some(raw) => serde_json::from_str::<ClusterConfigPayload>(raw)
                .map_err(|error| {
                    CoreError::InvalidConfig(format!("클러스터 설정 JSON 파싱에 실패했습니다: {}", error))
                })
                .map_err(to_py_err)?,
            None => ClusterConfigPayload::default(),
        };
        config.host = host;
        config.port = port;

        let runtime = create_runtime().map_err(to_py_err)?;
        let datastore = py
            .detach(|| runtime.block_on(OpenSearchDataStore::connect(&config)))
            .map_err(to_py_err)?;

        Ok(Self { runtime, datastore })
    }

    /// 클러스터가 보고한 서버 버전 문자열이다.
    #[getter]
    pub fn version(&self) -> String {
        self.datastore.server_version().raw.clone()
    }

    /// 검색을 실행하고 결과 JSON을 반환한다.
    #[pyo3(signature = (sketch_id, indices, query_string, query_filter_json=None))]
    pub fn search(
        &self,
        py: Python<'_>,
        sketch_id: u64,
        indices: Vec<String>,
        query_string: String,
        query_filter_json: Option<&str>,
    ) -> PyResult<String> {
        let query_filter = query_filter_json
            .map(serde_json::from_str::<QueryFilter>)
            .transpose()
            .map_err(|error| {
                CoreError::InvalidInput(format!("검색 필터 JSON 파싱에 실패했습니다: {}", error))
            })
            .map_err(to_py_err)?;

        let result = py
            .detach(|| {
                self.runtime.block_on(self.datastore.search(
                    sketch_id,
                    &indices,
                    &query_string,
                    query_filter,
                ))
            })
            .map_err(to_py_err)?;

        serde_json::to_string(&result)
            .map_err(|error| CoreError::Serialization(format!("검색 결과 직렬화 실패: {}", error)))
            .map_err(to_py_err)
    }
}

fn to_py_err(error: CoreError) -> PyErr {
    match error {
        CoreError::Connection(_) => PyConnectionError::new_err(error.to_string()),
        CoreError::QueryExecution(_) | CoreError::InvalidInput(_) | CoreError::InvalidConfig(_) => {
            PyValueError::new_err(error.to_string())
        }
        CoreError::Serialization(_) | CoreError::Runtime(_) => {
            PyRuntimeError::new_err(error.to_string())
        }
    }
}

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        // 호스트 애플리케이션이 이미 subscriber를 설치했으면 그대로 둔다.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

fn create_runtime() -> CoreResult<Runtime> {
    Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| CoreError::Runtime(format!("Tokio 런타임 생성 실패: {}", error)))
}
