//! # 요청 추출기(Extractor)
//!
//! Axum 기본 `Json`/`Path` 추출기는 파싱 실패 시 일반 텍스트 응답(400/422)을 돌려줍니다.
//! 여기 정의한 래퍼(`ApiJson`, `ApiPath`, `ApiQuery`)는 같은 실패를 `AppError::Validation`으로 바꾸어
//! 다른 에러와 같은 JSON 형식(`{ ok: false, errors: [...] }`)으로 응답합니다.
//! (예: 허용되지 않는 `practice_type`, 음수 개수)

use crate::error::{AppError, FieldError};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![FieldError::new("body", rejection.body_text())])
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(vec![FieldError::new("path", rejection.body_text())])
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(vec![FieldError::new("query", rejection.body_text())])
    }
}
