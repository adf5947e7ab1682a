// 목적:
// - 검색 백엔드 접근 계층 모듈을 선언한다.
//
// 설명:
// - 백엔드 트레이트, 인덱스 이름 유틸, HTTP 구현을 분리해 유지보수성을 확보한다.
//
// 디자인 패턴:
// - 저장소 패턴(Repository Pattern).
//
// 참조:
// - src_rs/index/backend.rs
// - src_rs/index/names.rs
// - src_rs/index/opensearch_repo.rs

pub mod backend;
pub mod names;
pub mod opensearch_repo;
