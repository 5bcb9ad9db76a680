//! # 레슨 평가(Student Assessment) 라우트 핸들러
//!
//! - `POST /api/v1/students/students` → 레슨 평가 저장 + 레슨 진도 갱신
//! - `GET  /api/v1/students/progress/{user_id}/lesson/{lesson_id}`
//! - `GET  /api/v1/students/progress/{user_id}/topic/{topic_id}`

use super::{ok, ok_with, ApiResult, AppState};
use crate::{
    extract::{ApiJson, ApiPath},
    middleware::auth::AuthUser,
    models::*,
    services,
};
use axum::extract::State;

pub async fn save_assessment(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<SaveAssessmentRequest>,
) -> ApiResult<SaveAssessmentResponse> {
    auth.ensure_can_access(req.user_id)?;
    let saved = services::progress::save_assessment(&state.pool, &req).await?;
    ok_with(saved, "Assessment saved")
}

pub async fn lesson_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((user_id, lesson_id)): ApiPath<(i64, i64)>,
) -> ApiResult<LessonProgressView> {
    auth.ensure_can_access(user_id)?;
    ok(services::progress::lesson_progress_view(&state.pool, user_id, lesson_id).await?)
}

pub async fn topic_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((user_id, topic_id)): ApiPath<(i64, i64)>,
) -> ApiResult<TopicLessonSummary> {
    auth.ensure_can_access(user_id)?;
    ok(services::progress::topic_lesson_summary(&state.pool, user_id, topic_id).await?)
}
