// 목적:
// - 인덱스 이름 관련 공통 유틸리티를 제공한다.
//
// 설명:
// - 호출자가 미리 해석한 인덱스 이름을 네트워크 호출 전에 검증한다.
// - 잘못된 이름은 백엔드 오류가 아니라 호출자 입력 오류로 처리한다.
//
// 디자인 패턴:
// - 가드 함수(Guard Function).
//
// 참조:
// - src_rs/core/search_pipeline.rs

use crate::core::errors::{CoreError, CoreResult};

const MAX_INDEX_NAME_BYTES: usize = 255;
const FORBIDDEN_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ':'];

/// 인덱스 이름 하나의 허용 문자를 검증한다.
pub fn validate_index_name(value: &str) -> CoreResult<()> {
    if value.is_empty() {
        return Err(CoreError::InvalidInput(
            "인덱스 이름은 비어 있을 수 없습니다".to_string(),
        ));
    }

    if value.len() > MAX_INDEX_NAME_BYTES {
        return Err(CoreError::InvalidInput(format!(
            "인덱스 이름은 {}바이트를 넘을 수 없습니다: {}",
            MAX_INDEX_NAME_BYTES, value
        )));
    }

    if value == "." || value == ".." {
        return Err(CoreError::InvalidInput(format!(
            "인덱스 이름으로 사용할 수 없습니다: {}",
            value
        )));
    }

    if value.starts_with(['-', '_', '+']) {
        return Err(CoreError::InvalidInput(format!(
            "인덱스 이름은 -, _, + 로 시작할 수 없습니다: {}",
            value
        )));
    }

    let valid = value.chars().all(|ch| {
        !ch.is_uppercase() && !ch.is_whitespace() && !FORBIDDEN_CHARS.contains(&ch)
    });

    if !valid {
        return Err(CoreError::InvalidInput(format!(
            "인덱스 이름에 허용되지 않는 문자가 있습니다: {}",
            value
        )));
    }

    Ok(())
}

/// 검색 대상 인덱스 목록 전체를 검증한다.
pub fn validate_indices(indices: &[String]) -> CoreResult<()> {
    if indices.is_empty() {
        return Err(CoreError::InvalidInput(
            "indices는 최소 1개 이상이어야 합니다".to_string(),
        ));
    }

    indices
        .iter()
        .map(String::as_str)
        .try_for_each(validate_index_name)
}

/// 인덱스 목록을 `_search` 경로에 쓰는 쉼표 구분 문자열로 만든다.
pub fn to_index_path(indices: &[String]) -> String {
    indices.join(",")
}
