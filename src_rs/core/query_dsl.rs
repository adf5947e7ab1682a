// 목적:
// - 쿼리 문자열과 필터로 OpenSearch 검색 본문을 만든다.
//
// 설명:
// - bool 쿼리(must: query_string, filter: 시간 범위/정확 일치)를 구성한다.
// - 서버 메이저 버전 7 이상이면 track_total_hits를 켠다.
//
// 디자인 패턴:
// - 빌더 함수(Builder Function).
//
// 참조:
// - src_rs/core/search_pipeline.rs
// - src_rs/core/datastore.rs

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::datastore::ServerVersion;
use crate::core::errors::{CoreError, CoreResult};

pub const DEFAULT_FROM: usize = 0;
pub const DEFAULT_SIZE: usize = 100;
pub const MAX_RESULT_WINDOW: usize = 10_000;
const DATETIME_FIELD: &str = "datetime";
const MATCH_ALL_QUERY: &str = "*";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermFilter {
    pub field: String,
    pub value: Value,
}

/// 검색 요청에 붙는 선택적 구조화 필터다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryFilter {
    pub from: usize,
    pub size: usize,
    pub order: SortOrder,
    pub time_ranges: Vec<TimeRange>,
    pub terms: Vec<TermFilter>,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            from: DEFAULT_FROM,
            size: DEFAULT_SIZE,
            order: SortOrder::Asc,
            time_ranges: Vec::new(),
            terms: Vec::new(),
        }
    }
}

impl QueryFilter {
    pub fn validate(&self) -> CoreResult<()> {
        if self.size == 0 {
            return Err(CoreError::InvalidInput(
                "filter.size는 1 이상이어야 합니다".to_string(),
            ));
        }

        if self.from.saturating_add(self.size) > MAX_RESULT_WINDOW {
            return Err(CoreError::InvalidInput(format!(
                "filter.from + filter.size는 {}를 넘을 수 없습니다: from={}, size={}",
                MAX_RESULT_WINDOW, self.from, self.size
            )));
        }

        for range in &self.time_ranges {
            if range.start.trim().is_empty() || range.end.trim().is_empty() {
                return Err(CoreError::InvalidInput(
                    "filter.time_ranges의 start/end는 비어 있을 수 없습니다".to_string(),
                ));
            }
        }

        if self.terms.iter().any(|term| term.field.trim().is_empty()) {
            return Err(CoreError::InvalidInput(
                "filter.terms의 field는 비어 있을 수 없습니다".to_string(),
            ));
        }

        Ok(())
    }
}

/// 검색 본문(JSON)을 만든다.
pub fn build_search_body(
    query_string: &str,
    filter: Option<&QueryFilter>,
    version: &ServerVersion,
) -> Value {
    let default_filter = QueryFilter::default();
    let filter = filter.unwrap_or(&default_filter);

    let query = if query_string.trim().is_empty() {
        MATCH_ALL_QUERY
    } else {
        query_string
    };

    let mut clauses = filter
        .time_ranges
        .iter()
        .map(|range| {
            json!({
                "range": {
                    DATETIME_FIELD: {"gte": range.start, "lte": range.end}
                }
            })
        })
        .collect::<Vec<_>>();
    clauses.extend(
        filter
            .terms
            .iter()
            .map(|term| json!({"term": {term.field.as_str(): term.value}})),
    );

    let mut body = Map::new();
    body.insert(
        "query".to_string(),
        json!({
            "bool": {
                "must": [
                    {"query_string": {"query": query, "default_operator": "AND"}}
                ],
                "filter": clauses
            }
        }),
    );
    body.insert("from".to_string(), json!(filter.from));
    body.insert("size".to_string(), json!(filter.size));
    body.insert(
        "sort".to_string(),
        json!([{DATETIME_FIELD: filter.order.as_str()}]),
    );

    if version.major >= 7 {
        body.insert("track_total_hits".to_string(), Value::Bool(true));
    }

    Value::Object(body)
}
