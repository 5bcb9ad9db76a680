use super::{ok, ApiResult, AppState};
use crate::{db, error::AppError, extract::ApiPath, models::CourseModules};
use axum::extract::State;

/// `GET /course-modules/{course_id}`: 코스와 순서대로 정렬된 토픽/레슨 트리
pub async fn course_modules(
    State(state): State<AppState>,
    ApiPath(course_id): ApiPath<i64>,
) -> ApiResult<CourseModules> {
    let modules = db::get_course_modules(&state.pool, course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    ok(modules)
}
