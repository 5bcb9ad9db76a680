//! # 연습 문제(Practice) 라우트 핸들러
//!
//! - `POST /api/v1/practice/submit` → 시도 기록, `{ attempt_id, score, passed }`
//! - `GET  /api/v1/practice/can-attempt/{user_id}/{topic_id}/{practice_type}/{section_index}`
//! - `GET  /api/v1/practice/topic-score/{user_id}/{topic_id}`
//! - `GET  /api/v1/practice/history/{user_id}/{topic_id}` → 최근 시도 순
//!
//! 잘못된 `practice_type`은 본문이든 경로든 400 검증 에러가 됩니다.
//! 다른 사용자의 `user_id`로 접근하면 관리자가 아닌 한 403입니다.

use super::{ok, ok_with, ApiResult, AppState};
use crate::{
    db,
    extract::{ApiJson, ApiPath},
    middleware::auth::AuthUser,
    models::*,
    services,
};
use axum::extract::State;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CanAttemptResponse {
    pub can_attempt: bool,
}

pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<SubmitPracticeRequest>,
) -> ApiResult<PracticeResult> {
    auth.ensure_can_access(req.user_id)?;
    let result = services::practice::submit(&state.pool, state.practices_per_topic, &req).await?;
    ok_with(result, "Practice submitted")
}

pub async fn can_attempt(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((user_id, topic_id, practice_type, section_index)): ApiPath<(
        i64,
        i64,
        PracticeType,
        i64,
    )>,
) -> ApiResult<CanAttemptResponse> {
    auth.ensure_can_access(user_id)?;
    let can_attempt =
        services::practice::can_attempt(&state.pool, user_id, topic_id, practice_type, section_index)
            .await?;
    ok(CanAttemptResponse { can_attempt })
}

pub async fn topic_score(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((user_id, topic_id)): ApiPath<(i64, i64)>,
) -> ApiResult<TopicScore> {
    auth.ensure_can_access(user_id)?;
    ok(services::practice::topic_score(&state.pool, user_id, topic_id).await?)
}

pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((user_id, topic_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Vec<PracticeAttempt>> {
    auth.ensure_can_access(user_id)?;
    ok(db::list_attempts(&state.pool, user_id, topic_id).await?)
}
