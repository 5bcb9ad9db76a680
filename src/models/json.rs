//! JSON 타입 컬럼 입력 처리.
//!
//! 프론트엔드는 배열/객체 필드를 구조화된 JSON으로 보내기도 하고,
//! `JSON.stringify` 결과 문자열로 보내기도 합니다.
//! `JsonField<T>`는 두 형태를 모두 받고, 문자열은 저장 전에 파싱하여 검증합니다.

use crate::error::FieldError;
use serde::{de::DeserializeOwned, Deserialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JsonField<T> {
    Value(T),
    Encoded(String),
}

impl<T: DeserializeOwned> JsonField<T> {
    /// 구조화된 값을 꺼냅니다. 인코딩된 문자열이 JSON으로 파싱되지 않으면 에러입니다.
    pub fn resolve(self, field: &str) -> Result<T, FieldError> {
        match self {
            JsonField::Value(value) => Ok(value),
            JsonField::Encoded(raw) => serde_json::from_str(&raw)
                .map_err(|e| FieldError::new(field, format!("must be valid JSON ({})", e))),
        }
    }
}

/// 설정값처럼 임의의 JSON을 받는 필드.
///
/// 문자열이 오면 JSON 텍스트로 간주하고 파싱합니다.
/// 그 외 값(숫자, 배열, 객체 등)은 그대로 저장합니다.
pub fn parse_json_value(
    value: serde_json::Value,
    field: &str,
) -> Result<serde_json::Value, FieldError> {
    match value {
        serde_json::Value::String(raw) => serde_json::from_str(&raw)
            .map_err(|e| FieldError::new(field, format!("must be valid JSON ({})", e))),
        other => Ok(other),
    }
}
