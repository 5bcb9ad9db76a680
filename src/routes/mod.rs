//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 인증 관련 (회원가입, 로그인, 토큰 갱신, 로그아웃)
//! - `users`: 사용자 조회와 역할 변경 (관리자)
//! - `practice`: 연습 문제 제출/점수 조회
//! - `progress`: 토픽 단위 진도와 대시보드
//! - `students`: 레슨 평가 저장과 레슨/토픽 진도 조회
//! - `content`: 코스/토픽/레슨 CRUD
//! - `modules`: 코스 모듈 트리
//! - `admin`: 코스 콘텐츠 일괄 교체
//! - `settings`: 전역 설정 CRUD
//! - `health`: 서버 상태 확인 (헬스체크)
//!
//! 성공 응답은 모두 `{ ok: true, data, message? }` 형태입니다.

pub mod admin;
pub mod auth;
pub mod content;
pub mod health;
pub mod modules;
pub mod practice;
pub mod progress;
pub mod settings;
pub mod students;
pub mod users;

use crate::error::AppError;
use axum::{
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
    /// 시도 횟수 기반 토픽 진도의 분모
    pub practices_per_topic: u32,
}

/// 성공 응답 봉투(envelope)
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse {
        ok: true,
        data,
        message: None,
    }))
}

pub fn ok_with<T: Serialize>(data: T, message: impl Into<String>) -> ApiResult<T> {
    Ok(Json(ApiResponse {
        ok: true,
        data,
        message: Some(message.into()),
    }))
}

/// `/api/v1` 아래에 들어갈 모든 API 라우트
pub fn api_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let practice_routes = Router::new()
        .route("/practice/submit", post(practice::submit))
        .route(
            "/practice/can-attempt/{user_id}/{topic_id}/{practice_type}/{section_index}",
            get(practice::can_attempt),
        )
        .route(
            "/practice/topic-score/{user_id}/{topic_id}",
            get(practice::topic_score),
        )
        .route(
            "/practice/history/{user_id}/{topic_id}",
            get(practice::history),
        );

    let progress_routes = Router::new()
        .route("/progress/student/{user_id}", get(progress::list_progress))
        .route(
            "/progress/student/{user_id}/topic/{topic_id}",
            get(progress::get_topic_progress).put(progress::update_topic_progress),
        )
        .route("/progress/dashboard/{user_id}", get(progress::dashboard))
        .route("/students/students", post(students::save_assessment))
        .route(
            "/students/progress/{user_id}/lesson/{lesson_id}",
            get(students::lesson_progress),
        )
        .route(
            "/students/progress/{user_id}/topic/{topic_id}",
            get(students::topic_summary),
        );

    let content_routes = Router::new()
        .route(
            "/content/courses",
            get(content::list_courses).post(content::create_course),
        )
        .route(
            "/content/courses/{id}",
            get(content::get_course)
                .put(content::update_course)
                .delete(content::delete_course),
        )
        .route("/content/courses/{id}/topics", get(content::list_topics))
        .route("/content/topics", post(content::create_topic))
        .route(
            "/content/topics/{id}",
            get(content::get_topic)
                .put(content::update_topic)
                .delete(content::delete_topic),
        )
        .route("/content/topics/{id}/lessons", get(content::list_lessons))
        .route("/content/lessons", post(content::create_lesson))
        .route(
            "/content/lessons/{id}",
            get(content::get_lesson)
                .put(content::update_lesson)
                .delete(content::delete_lesson),
        )
        .route("/course-modules/{course_id}", get(modules::course_modules))
        .route(
            "/admin/courses/{course_id}/content",
            put(admin::replace_content),
        )
        .route("/admin/uploads", get(admin::list_uploads))
        .route(
            "/settings",
            get(settings::list_settings).post(settings::create_setting),
        )
        .route(
            "/settings/{name}",
            get(settings::get_setting)
                .put(settings::update_setting)
                .delete(settings::delete_setting),
        );

    Router::new()
        .merge(auth_routes)
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/role", put(users::set_role))
        .merge(practice_routes)
        .merge(progress_routes)
        .merge(content_routes)
        .route("/health", get(health::health_check))
        .with_state(state)
}
