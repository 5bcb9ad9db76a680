//! # 코스/토픽/레슨(Content) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET|POST          /api/v1/content/courses`
//! - `GET|PUT|DELETE    /api/v1/content/courses/{id}`
//! - `GET               /api/v1/content/courses/{id}/topics`
//! - `POST              /api/v1/content/topics`
//! - `GET|PUT|DELETE    /api/v1/content/topics/{id}`
//! - `GET               /api/v1/content/topics/{id}/lessons`
//! - `POST              /api/v1/content/lessons`
//! - `GET|PUT|DELETE    /api/v1/content/lessons/{id}`
//!
//! 조회는 인증 없이 가능하고, 쓰기는 `AuthUser`가 필요합니다.
//!
//! 삭제 전 의존성 확인: 토픽이 있는 코스, 레슨이 있는 토픽은 삭제할 수 없습니다(400).
//! 수정(PUT)은 보낸 필드만 바꾸며, 바꿀 필드가 하나도 없으면 400입니다.

use super::{ok, ok_with, ApiResult, AppState};
use crate::{
    db,
    error::AppError,
    extract::{ApiJson, ApiPath},
    middleware::auth::AuthUser,
    models::*,
};
use axum::extract::State;
use serde_json::{json, Value};

fn require_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::invalid("title", "title is required"));
    }
    Ok(())
}

fn no_fields() -> AppError {
    AppError::BadRequest("No fields to update".to_string())
}

// ── 코스(Course) ──

pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Vec<Course>> {
    ok(db::list_courses(&state.pool).await?)
}

pub async fn get_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Course> {
    let course = db::get_course(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    ok(course)
}

pub async fn create_course(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(req): ApiJson<CreateCourseRequest>,
) -> ApiResult<Course> {
    require_title(&req.title)?;
    let slug = slug::slugify(&req.title);
    let course = db::create_course(&state.pool, &req, &slug).await?;
    tracing::info!(course_id = course.id, slug = %course.slug, "course created");
    ok_with(course, "Course created")
}

pub async fn update_course(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<CoursePatch>,
) -> ApiResult<Course> {
    if patch.is_empty() {
        return Err(no_fields());
    }
    if let Some(title) = &patch.title {
        require_title(title)?;
    }
    let course = db::update_course(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    ok_with(course, "Course updated")
}

pub async fn delete_course(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Value> {
    if db::get_course(&state.pool, id).await?.is_none() {
        return Err(AppError::not_found("Course"));
    }
    if db::count_topics(&state.pool, id).await? > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete course: it contains topics".to_string(),
        ));
    }
    db::delete_course(&state.pool, id).await?;
    tracing::info!(course_id = id, "course deleted");
    ok_with(json!({ "id": id }), "Course deleted")
}

// ── 토픽(Topic) ──

pub async fn list_topics(
    State(state): State<AppState>,
    ApiPath(course_id): ApiPath<i64>,
) -> ApiResult<Vec<Topic>> {
    if db::get_course(&state.pool, course_id).await?.is_none() {
        return Err(AppError::not_found("Course"));
    }
    ok(db::list_topics(&state.pool, course_id).await?)
}

pub async fn get_topic(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Topic> {
    let topic = db::get_topic(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Topic"))?;
    ok(topic)
}

pub async fn create_topic(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(req): ApiJson<CreateTopicRequest>,
) -> ApiResult<Topic> {
    require_title(&req.title)?;
    if db::get_course(&state.pool, req.course_id).await?.is_none() {
        return Err(AppError::not_found("Course"));
    }
    let topic = db::create_topic(&state.pool, &req).await?;
    ok_with(topic, "Topic created")
}

pub async fn update_topic(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<TopicPatch>,
) -> ApiResult<Topic> {
    if patch.is_empty() {
        return Err(no_fields());
    }
    if let Some(title) = &patch.title {
        require_title(title)?;
    }
    let topic = db::update_topic(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found("Topic"))?;
    ok_with(topic, "Topic updated")
}

pub async fn delete_topic(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Value> {
    if db::get_topic(&state.pool, id).await?.is_none() {
        return Err(AppError::not_found("Topic"));
    }
    if db::count_lessons(&state.pool, id).await? > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete topic: it contains lessons".to_string(),
        ));
    }
    db::delete_topic(&state.pool, id).await?;
    tracing::info!(topic_id = id, "topic deleted");
    ok_with(json!({ "id": id }), "Topic deleted")
}

// ── 레슨(Lesson) ──

pub async fn list_lessons(
    State(state): State<AppState>,
    ApiPath(topic_id): ApiPath<i64>,
) -> ApiResult<Vec<Lesson>> {
    if db::get_topic(&state.pool, topic_id).await?.is_none() {
        return Err(AppError::not_found("Topic"));
    }
    ok(db::list_lessons(&state.pool, topic_id).await?)
}

pub async fn get_lesson(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Lesson> {
    let lesson = db::get_lesson(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Lesson"))?;
    ok(lesson)
}

pub async fn create_lesson(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(mut req): ApiJson<CreateLessonRequest>,
) -> ApiResult<Lesson> {
    require_title(&req.title)?;
    let fields = req.resolve_fields().map_err(AppError::Validation)?;
    if db::get_topic(&state.pool, req.topic_id).await?.is_none() {
        return Err(AppError::not_found("Topic"));
    }
    let lesson = db::create_lesson(&state.pool, &req, &fields).await?;
    ok_with(lesson, "Lesson created")
}

pub async fn update_lesson(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<LessonPatch>,
) -> ApiResult<Lesson> {
    let patch = patch.resolve().map_err(AppError::Validation)?;
    if patch.is_empty() {
        return Err(no_fields());
    }
    if let Some(title) = &patch.title {
        require_title(title)?;
    }
    let lesson = db::update_lesson(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found("Lesson"))?;
    ok_with(lesson, "Lesson updated")
}

pub async fn delete_lesson(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Value> {
    if !db::delete_lesson(&state.pool, id).await? {
        return Err(AppError::not_found("Lesson"));
    }
    ok_with(json!({ "id": id }), "Lesson deleted")
}
