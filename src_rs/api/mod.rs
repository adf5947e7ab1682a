// 목적:
// - Python FFI 경계 모듈을 선언한다.
//
// 설명:
// - 검색 브릿지를 Python 계층에서 OpenSearchDataStore 클래스로 사용할 수 있게 한다.
//
// 디자인 패턴:
// - 모듈 분리(Module Separation).
//
// 참조:
// - src_rs/api/search_bridge.rs

pub mod search_bridge;
