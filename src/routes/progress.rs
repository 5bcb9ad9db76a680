//! # 토픽 진도(Progress) 라우트 핸들러
//!
//! - `GET /api/v1/progress/student/{user_id}?course_id=` → 토픽 단위 진도 목록
//! - `GET /api/v1/progress/student/{user_id}/topic/{topic_id}` → 토픽 진도 하나
//! - `PUT /api/v1/progress/student/{user_id}/topic/{topic_id}` → 상태 직접 변경
//! - `GET /api/v1/progress/dashboard/{user_id}` → 코스별 요약

use super::{ok, ok_with, ApiResult, AppState};
use crate::{
    db,
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::auth::AuthUser,
    models::*,
    services,
};
use axum::extract::State;

pub async fn list_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(user_id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<ProgressFilter>,
) -> ApiResult<Vec<ProgressListItem>> {
    auth.ensure_can_access(user_id)?;
    ok(db::list_topic_progress(&state.pool, user_id, filter.course_id).await?)
}

/// 기록이 없는 토픽은 404 대신 `not_started` 상태로 응답합니다.
pub async fn get_topic_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((user_id, topic_id)): ApiPath<(i64, i64)>,
) -> ApiResult<TopicProgressView> {
    auth.ensure_can_access(user_id)?;
    if db::get_topic(&state.pool, topic_id).await?.is_none() {
        return Err(AppError::not_found("Topic"));
    }
    let view = db::find_progress(&state.pool, user_id, topic_id, None)
        .await?
        .map(TopicProgressView::from)
        .unwrap_or_else(|| TopicProgressView::not_started(user_id, topic_id));
    ok(view)
}

pub async fn update_topic_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((user_id, topic_id)): ApiPath<(i64, i64)>,
    ApiJson(req): ApiJson<UpdateTopicProgressRequest>,
) -> ApiResult<TopicProgressView> {
    auth.ensure_can_access(user_id)?;
    let row = services::progress::set_topic_status(&state.pool, user_id, topic_id, &req).await?;
    ok_with(TopicProgressView::from(row), "Progress updated")
}

pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Vec<DashboardCourse>> {
    auth.ensure_can_access(user_id)?;
    ok(db::dashboard(&state.pool, user_id).await?)
}
