//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형: 검증/미존재/권한/충돌/트랜잭션/내부 에러를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 `{ ok: false, message, code }` JSON 응답으로 변환
//! - `FieldError`: 필드 단위 검증 실패 정보 (`errors` 배열로 응답)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// 필드 단위 검증 실패 하나
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    /// 어떤 리소스인지 메시지로 전달합니다. (예: "Topic not found")
    #[error("{0}")]
    NotFound(String),

    /// 잘못된 요청 (HTTP 400)
    #[error("{0}")]
    BadRequest(String),

    /// 필드 검증 실패 (HTTP 400, `errors` 배열 포함)
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// 이미 완료한 연습 문제를 다시 제출 (HTTP 400)
    #[error("Practice already completed")]
    AlreadyCompleted,

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 권한 없음 (HTTP 403): 다른 사용자의 학습 기록에 접근
    #[error("{0}")]
    Forbidden(String),

    /// 리소스 충돌 (HTTP 409)
    #[error("{0}")]
    Conflict(String),

    /// 트랜잭션 롤백 (HTTP 500)
    /// 일반 내부 에러와 달리 원인 메시지를 응답에 포함합니다.
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx 함수 결과에 `?`를 쓰면 자동으로 이 variant로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// `AppError::NotFound`를 만드는 축약 함수
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} not found", what))
    }

    /// 필드 하나짜리 검증 에러
    pub fn invalid(field: &str, message: &str) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    /// 상태 코드와 응답용 에러 코드
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::AlreadyCompleted => (StatusCode::BAD_REQUEST, "already_completed"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Transaction(_) => (StatusCode::INTERNAL_SERVER_ERROR, "transaction_failed"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
        }
    }
}

/// sqlx 에러가 UNIQUE 제약 위반인지 확인합니다.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 내용을 로그에만 기록하고,
    /// 클라이언트에는 "Internal server error"만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code) = self.status();

        let body = match self {
            AppError::Validation(errors) => json!({
                "ok": false,
                "code": code,
                "message": "Validation failed",
                "errors": errors,
            }),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({ "ok": false, "code": code, "message": "Internal server error" })
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                json!({ "ok": false, "code": code, "message": "Internal server error" })
            }
            AppError::Transaction(ref msg) => {
                tracing::error!("Transaction rolled back: {}", msg);
                json!({ "ok": false, "code": code, "message": format!("Transaction failed: {}", msg) })
            }
            other => json!({ "ok": false, "code": code, "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
