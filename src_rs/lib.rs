// 목적:
// - Sketch Search Rust 모듈의 진입점을 제공한다.
//
// 설명:
// - 검색 클러스터 연결, 검색 실행, 실패 정규화를 Rust 코어에서 담당한다.
// - `python` 기능을 켜면 Python 확장 모듈로 노출된다.
//
// 디자인 패턴:
// - 계층형 모듈 구조(api/core/index).
//
// 참조:
// - src_rs/api/search_bridge.rs
// - src_rs/core/datastore.rs

#[cfg(feature = "python")]
pub mod api;
pub mod core;
pub mod index;

pub use crate::core::datastore::{ClusterConfigPayload, OpenSearchDataStore, ServerVersion};
pub use crate::core::errors::{CoreError, CoreResult, FailureCategory, NormalizedError};
pub use crate::core::query_dsl::QueryFilter;
pub use crate::core::search_pipeline::SearchRequest;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn _sketch_search(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<api::search_bridge::PyOpenSearchDataStore>()?;
    Ok(())
}
