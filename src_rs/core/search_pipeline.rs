// 목적:
// - 검색 요청 1건을 실행하고 실패를 정규화한다.
//
// 설명:
// - 요청 검증 -> 검색 본문 생성 -> 백엔드 search 1회 호출 -> 실패 분류 순서로 처리한다.
// - 재시도하지 않는다. 성공 응답은 가공 없이 그대로 돌려준다.
//
// 디자인 패턴:
// - 파이프라인(Pipeline).
//
// 참조:
// - src_rs/core/classify.rs
// - src_rs/core/query_dsl.rs
// - src_rs/index/backend.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::classify::classify;
use crate::core::datastore::ServerVersion;
use crate::core::errors::{CoreError, CoreResult};
use crate::core::query_dsl::{build_search_body, QueryFilter};
use crate::index::backend::SearchBackend;
use crate::index::names::validate_indices;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub sketch_id: u64,
    pub indices: Vec<String>,
    pub query_string: String,
    #[serde(default)]
    pub query_filter: Option<QueryFilter>,
}

/// 검색 파이프라인을 실행한다.
pub async fn execute_search(
    backend: &dyn SearchBackend,
    version: &ServerVersion,
    request: &SearchRequest,
) -> CoreResult<Value> {
    validate_request(request)?;

    let body = build_search_body(
        &request.query_string,
        request.query_filter.as_ref(),
        version,
    );
    tracing::debug!(
        sketch_id = request.sketch_id,
        indices = ?request.indices,
        "검색 실행"
    );

    match backend.search(&request.indices, &body).await {
        Ok(payload) => Ok(payload),
        Err(failure) => {
            let normalized = classify(&failure);
            tracing::warn!(
                sketch_id = request.sketch_id,
                category = normalized.category.as_str(),
                error = %normalized,
                "검색 실행 실패"
            );
            Err(CoreError::QueryExecution(normalized))
        }
    }
}

fn validate_request(request: &SearchRequest) -> CoreResult<()> {
    if request.sketch_id == 0 {
        return Err(CoreError::InvalidInput(
            "sketch_id는 1 이상이어야 합니다".to_string(),
        ));
    }

    validate_indices(&request.indices)?;

    if let Some(filter) = request.query_filter.as_ref() {
        filter.validate()?;
    }

    Ok(())
}
