// 목적:
// - 핵심 런타임 계층 모듈을 선언한다.
//
// 설명:
// - 연결 부트스트랩, 검색 실행, 실패 분류, 공통 오류 모델을 분리해 유지보수성을 높인다.
//
// 디자인 패턴:
// - 명시적 오류 모델(Explicit Error Model).
//
// 참조:
// - src_rs/core/errors.rs
// - src_rs/core/classify.rs
// - src_rs/core/datastore.rs
// - src_rs/core/search_pipeline.rs

pub mod classify;
pub mod datastore;
pub mod errors;
pub mod query_dsl;
pub mod search_pipeline;
