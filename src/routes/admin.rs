//! # 관리자(Admin) 라우트 핸들러
//!
//! - `PUT /api/v1/admin/courses/{course_id}/content` → 코스 콘텐츠 일괄 교체
//! - `GET /api/v1/admin/uploads` → 교체 이력
//!
//! 일괄 교체는 전부 성공하거나 전부 취소됩니다.
//! 트랜잭션 안에서 난 에러는 원인 메시지와 함께 500으로 응답합니다.

use super::{ok, ok_with, ApiResult, AppState};
use crate::{
    db,
    error::AppError,
    extract::{ApiJson, ApiPath},
    middleware::auth::AuthUser,
    models::*,
};
use axum::extract::State;

pub async fn replace_content(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(course_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ContentPayload>,
) -> ApiResult<ReplaceContentResponse> {
    if db::get_course(&state.pool, course_id).await?.is_none() {
        return Err(AppError::not_found("Course"));
    }
    if let Some(index) = payload.topics.iter().position(|t| t.title.trim().is_empty()) {
        return Err(AppError::invalid(
            &format!("topics[{}].title", index),
            "title is required",
        ));
    }

    let result = db::replace_course_content(&state.pool, course_id, auth.user_id, &payload)
        .await
        .map_err(|e| AppError::Transaction(e.to_string()))?;

    tracing::info!(
        course_id,
        uploaded_by = auth.user_id,
        topic_count = result.topic_count,
        lesson_count = result.lesson_count,
        "course content replaced"
    );
    ok_with(result, "Course content replaced")
}

pub async fn list_uploads(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Vec<ContentUpload>> {
    ok(db::list_uploads(&state.pool).await?)
}
