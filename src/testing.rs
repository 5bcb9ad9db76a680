//! 라우터 단위 테스트.
//!
//! 마이그레이션을 적용한 인메모리 SQLite 위에 전체 API 라우터를 올리고
//! `axum_test::TestServer`로 요청을 보냅니다.
//! 인메모리 DB는 연결마다 따로 생기므로 풀 크기는 1로 고정합니다.

use crate::routes::{api_router, AppState};
use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub async fn test_state() -> AppState {
    AppState {
        pool: test_pool().await,
        jwt_secret: "test-secret".to_string(),
        practices_per_topic: crate::config::DEFAULT_PRACTICES_PER_TOPIC,
    }
}

pub fn test_server(state: AppState) -> TestServer {
    let app = Router::new().nest("/api/v1", api_router(state));
    TestServer::new(app).unwrap()
}

/// 사용자를 등록하고 (user_id, access_token)을 반환합니다.
pub async fn register(server: &TestServer, username: &str) -> (i64, String) {
    let res = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "correct-horse",
        }))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    (
        body["data"]["user"]["id"].as_i64().unwrap(),
        body["data"]["access_token"].as_str().unwrap().to_string(),
    )
}

pub async fn create_course(server: &TestServer, token: &str, title: &str) -> i64 {
    let res = server
        .post("/api/v1/content/courses")
        .authorization_bearer(token)
        .json(&json!({ "title": title, "level": "beginner" }))
        .await;
    res.assert_status_ok();
    res.json::<Value>()["data"]["id"].as_i64().unwrap()
}

pub async fn create_topic(server: &TestServer, token: &str, course_id: i64, title: &str) -> i64 {
    let res = server
        .post("/api/v1/content/topics")
        .authorization_bearer(token)
        .json(&json!({ "course_id": course_id, "title": title }))
        .await;
    res.assert_status_ok();
    res.json::<Value>()["data"]["id"].as_i64().unwrap()
}

pub async fn create_lesson(server: &TestServer, token: &str, topic_id: i64, title: &str) -> i64 {
    let res = server
        .post("/api/v1/content/lessons")
        .authorization_bearer(token)
        .json(&json!({ "topic_id": topic_id, "title": title, "content": "..." }))
        .await;
    res.assert_status_ok();
    res.json::<Value>()["data"]["id"].as_i64().unwrap()
}

/// 정답 수만 지정한 평가 답안 목록
fn answers(correct: usize, total: usize) -> Value {
    let items: Vec<Value> = (0..total)
        .map(|i| {
            json!({
                "prompt": format!("question {}", i),
                "user_answer": "a",
                "correct_answer": "a",
                "is_correct": i < correct,
            })
        })
        .collect();
    Value::Array(items)
}

mod practice {
    use super::*;

    #[tokio::test]
    async fn submit_then_can_attempt_and_topic_score() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "alice").await;
        let course_id = create_course(&server, &token, "Everyday English").await;
        let topic_id = create_topic(&server, &token, course_id, "Greetings").await;

        let res = server
            .post("/api/v1/practice/submit")
            .authorization_bearer(&token)
            .json(&json!({
                "user_id": user_id,
                "topic_id": topic_id,
                "practice_type": "listening",
                "section_index": 0,
                "total_questions": 10,
                "correct_answers": 7,
            }))
            .await;
        res.assert_status_ok();
        let body: Value = res.json();
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"]["score"].as_f64(), Some(70.0));
        assert_eq!(body["data"]["passed"], true);

        let res = server
            .get(&format!(
                "/api/v1/practice/can-attempt/{}/{}/listening/0",
                user_id, topic_id
            ))
            .authorization_bearer(&token)
            .await;
        res.assert_status_ok();
        assert_eq!(res.json::<Value>()["data"]["can_attempt"], false);

        // 다른 섹션은 아직 시도 가능
        let res = server
            .get(&format!(
                "/api/v1/practice/can-attempt/{}/{}/listening/1",
                user_id, topic_id
            ))
            .authorization_bearer(&token)
            .await;
        assert_eq!(res.json::<Value>()["data"]["can_attempt"], true);

        let res = server
            .get(&format!("/api/v1/practice/topic-score/{}/{}", user_id, topic_id))
            .authorization_bearer(&token)
            .await;
        let score = res.json::<Value>()["data"].clone();
        assert_eq!(score["average_score"].as_f64(), Some(70.0));
        assert_eq!(score["total_practices"], 1);
        assert_eq!(score["passed_practices"], 1);
        assert_eq!(score["completion_rate"].as_f64(), Some(100.0));
    }

    #[tokio::test]
    async fn duplicate_submission_is_rejected() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "bob").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;

        let body = json!({
            "user_id": user_id,
            "topic_id": topic_id,
            "practice_type": "speaking",
            "section_index": 2,
            "total_questions": 5,
            "correct_answers": 5,
        });
        server
            .post("/api/v1/practice/submit")
            .authorization_bearer(&token)
            .json(&body)
            .await
            .assert_status_ok();

        let res = server
            .post("/api/v1/practice/submit")
            .authorization_bearer(&token)
            .json(&body)
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        let err: Value = res.json();
        assert_eq!(err["ok"], false);
        assert_eq!(err["code"], "already_completed");

        let res = server
            .get(&format!("/api/v1/practice/history/{}/{}", user_id, topic_id))
            .authorization_bearer(&token)
            .await;
        assert_eq!(res.json::<Value>()["data"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn unknown_practice_type_is_a_validation_error() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "carol").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;

        let res = server
            .post("/api/v1/practice/submit")
            .authorization_bearer(&token)
            .json(&json!({
                "user_id": user_id,
                "topic_id": topic_id,
                "practice_type": "reading",
                "section_index": 0,
                "total_questions": 10,
                "correct_answers": 7,
            }))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(res.json::<Value>()["code"], "validation_error");

        let res = server
            .get(&format!(
                "/api/v1/practice/can-attempt/{}/{}/reading/0",
                user_id, topic_id
            ))
            .authorization_bearer(&token)
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn more_correct_than_total_is_rejected() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "dave").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;

        let res = server
            .post("/api/v1/practice/submit")
            .authorization_bearer(&token)
            .json(&json!({
                "user_id": user_id,
                "topic_id": topic_id,
                "practice_type": "fill_in_blank",
                "section_index": 0,
                "total_questions": 3,
                "correct_answers": 4,
            }))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(res.json::<Value>()["errors"][0]["field"], "correct_answers");
    }

    #[tokio::test]
    async fn submit_to_missing_topic_is_not_found() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "erin").await;

        let res = server
            .post("/api/v1/practice/submit")
            .authorization_bearer(&token)
            .json(&json!({
                "user_id": user_id,
                "topic_id": 999,
                "practice_type": "listening",
                "section_index": 0,
                "total_questions": 10,
                "correct_answers": 7,
            }))
            .await;
        res.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(res.json::<Value>()["message"], "Topic not found");
    }

    #[tokio::test]
    async fn pass_mark_uses_unrounded_score() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "rosa").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;

        // 69996 / 100000 = 69.996 → 70.0으로 반올림되지만 70 미만
        let res = server
            .post("/api/v1/practice/submit")
            .authorization_bearer(&token)
            .json(&json!({
                "user_id": user_id,
                "topic_id": topic_id,
                "practice_type": "fill_in_blank",
                "section_index": 0,
                "total_questions": 100000,
                "correct_answers": 69996,
            }))
            .await;
        res.assert_status_ok();
        let data = res.json::<Value>()["data"].clone();
        assert_eq!(data["score"].as_f64(), Some(70.0));
        assert_eq!(data["passed"], false);
    }

    #[tokio::test]
    async fn other_users_records_are_forbidden() {
        let server = test_server(test_state().await);
        let (owner_id, owner_token) = register(&server, "sam").await;
        let (_, other_token) = register(&server, "trudy").await;
        let course_id = create_course(&server, &owner_token, "Course").await;
        let topic_id = create_topic(&server, &owner_token, course_id, "Topic").await;

        let res = server
            .post("/api/v1/practice/submit")
            .authorization_bearer(&other_token)
            .json(&json!({
                "user_id": owner_id,
                "topic_id": topic_id,
                "practice_type": "listening",
                "section_index": 0,
                "total_questions": 10,
                "correct_answers": 10,
            }))
            .await;
        res.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(res.json::<Value>()["code"], "forbidden");

        let res = server
            .get(&format!("/api/v1/progress/dashboard/{}", owner_id))
            .authorization_bearer(&other_token)
            .await;
        res.assert_status(StatusCode::FORBIDDEN);

        // 거부된 제출은 아무것도 남기지 않는다
        let res = server
            .get(&format!("/api/v1/practice/history/{}/{}", owner_id, topic_id))
            .authorization_bearer(&owner_token)
            .await;
        assert_eq!(res.json::<Value>()["data"], json!([]));
    }

    #[tokio::test]
    async fn requests_without_token_are_unauthorized() {
        let server = test_server(test_state().await);

        let res = server
            .post("/api/v1/practice/submit")
            .json(&json!({
                "user_id": 1,
                "topic_id": 1,
                "practice_type": "listening",
                "section_index": 0,
                "total_questions": 10,
                "correct_answers": 7,
            }))
            .await;
        res.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(res.json::<Value>()["ok"], false);

        let res = server
            .get("/api/v1/progress/student/1")
            .authorization_bearer("not-a-jwt")
            .await;
        res.assert_status(StatusCode::UNAUTHORIZED);
    }
}

mod progress {
    use super::*;

    async fn submit(server: &TestServer, token: &str, user_id: i64, topic_id: i64, ty: &str, section: u32, correct: u32) {
        server
            .post("/api/v1/practice/submit")
            .authorization_bearer(token)
            .json(&json!({
                "user_id": user_id,
                "topic_id": topic_id,
                "practice_type": ty,
                "section_index": section,
                "total_questions": 10,
                "correct_answers": correct,
            }))
            .await
            .assert_status_ok();
    }

    async fn put_status(server: &TestServer, token: &str, url: &str, status: &str) -> Value {
        // 타임스탬프는 밀리초 단위라 쓰기 사이에 간격을 둔다
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let res = server
            .put(url)
            .authorization_bearer(token)
            .json(&json!({ "status": status }))
            .await;
        res.assert_status_ok();
        res.json::<Value>()["data"].clone()
    }

    async fn topic_progress(server: &TestServer, token: &str, user_id: i64, topic_id: i64) -> Value {
        let res = server
            .get(&format!("/api/v1/progress/student/{}/topic/{}", user_id, topic_id))
            .authorization_bearer(token)
            .await;
        res.assert_status_ok();
        res.json::<Value>()["data"].clone()
    }

    #[tokio::test]
    async fn untouched_topic_reads_as_not_started() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "frank").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;

        let view = topic_progress(&server, &token, user_id, topic_id).await;
        assert_eq!(view["status"], "not_started");
        assert_eq!(view["progress_percentage"].as_f64(), Some(0.0));
    }

    #[tokio::test]
    async fn fifteen_passing_attempts_complete_the_topic() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "grace").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;

        submit(&server, &token, user_id, topic_id, "listening", 0, 8).await;
        let view = topic_progress(&server, &token, user_id, topic_id).await;
        assert_eq!(view["status"], "in_progress");
        assert_eq!(view["progress_percentage"].as_f64(), Some(6.67));
        assert!(view["started_at"].is_string());

        for ty in ["listening", "speaking", "fill_in_blank"] {
            for section in 0..5 {
                if ty == "listening" && section == 0 {
                    continue;
                }
                submit(&server, &token, user_id, topic_id, ty, section, 8).await;
            }
        }

        let view = topic_progress(&server, &token, user_id, topic_id).await;
        assert_eq!(view["status"], "completed");
        assert_eq!(view["progress_percentage"].as_f64(), Some(100.0));
        assert!(view["completed_at"].is_string());

        let res = server
            .get(&format!("/api/v1/progress/dashboard/{}", user_id))
            .authorization_bearer(&token)
            .await;
        let dashboard = res.json::<Value>()["data"][0].clone();
        assert_eq!(dashboard["course_id"], course_id);
        assert_eq!(dashboard["completed_topics"], 1);
        assert_eq!(dashboard["average_progress"].as_f64(), Some(100.0));
    }

    #[tokio::test]
    async fn full_coverage_with_low_average_stays_in_progress() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "heidi").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;

        for ty in ["listening", "speaking", "fill_in_blank"] {
            for section in 0..5 {
                submit(&server, &token, user_id, topic_id, ty, section, 5).await;
            }
        }

        let view = topic_progress(&server, &token, user_id, topic_id).await;
        assert_eq!(view["status"], "in_progress");
        assert_eq!(view["progress_percentage"].as_f64(), Some(100.0));
        assert!(view["completed_at"].is_null());
    }

    #[tokio::test]
    async fn explicit_status_update_and_course_filter() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "ivan").await;
        let first = create_course(&server, &token, "First").await;
        let second = create_course(&server, &token, "Second").await;
        let a = create_topic(&server, &token, first, "A").await;
        let b = create_topic(&server, &token, second, "B").await;

        for topic_id in [a, b] {
            server
                .put(&format!("/api/v1/progress/student/{}/topic/{}", user_id, topic_id))
                .authorization_bearer(&token)
                .json(&json!({ "status": "completed" }))
                .await
                .assert_status_ok();
        }

        let res = server
            .get(&format!("/api/v1/progress/student/{}", user_id))
            .authorization_bearer(&token)
            .add_query_param("course_id", second)
            .await;
        let rows = res.json::<Value>()["data"].clone();
        assert_eq!(rows.as_array().map(Vec::len), Some(1));
        assert_eq!(rows[0]["topic_id"], b);
        assert_eq!(rows[0]["progress_percentage"].as_f64(), Some(100.0));

        let res = server
            .put(&format!("/api/v1/progress/student/{}/topic/{}", user_id, a))
            .authorization_bearer(&token)
            .json(&json!({ "status": "in_progress", "progress_percentage": 140 }))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);

        let res = server
            .put(&format!("/api/v1/progress/student/{}/topic/{}", user_id, a))
            .authorization_bearer(&token)
            .json(&json!({ "status": "in_progress", "progress_percentage": 40 }))
            .await;
        let data = res.json::<Value>()["data"].clone();
        assert_eq!(data["status"], "in_progress");
        assert!(data["completed_at"].is_null());
    }

    #[tokio::test]
    async fn started_at_is_written_once_and_completed_at_follows_status() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "olga").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;
        let url = format!("/api/v1/progress/student/{}/topic/{}", user_id, topic_id);

        let first = put_status(&server, &token, &url, "in_progress").await;
        let started_at = first["started_at"].as_str().unwrap().to_string();
        assert!(first["completed_at"].is_null());

        let done = put_status(&server, &token, &url, "completed").await;
        assert_eq!(done["started_at"], started_at.as_str());
        assert!(done["completed_at"].is_string());
        assert!(done["last_accessed"].as_str() > first["last_accessed"].as_str());

        let reopened = put_status(&server, &token, &url, "in_progress").await;
        assert_eq!(reopened["started_at"], started_at.as_str());
        assert!(reopened["completed_at"].is_null());
        assert!(reopened["last_accessed"].as_str() > done["last_accessed"].as_str());
    }

    #[tokio::test]
    async fn concurrent_submits_share_one_topic_row() {
        let state = test_state().await;
        let pool = state.pool.clone();
        let server = test_server(state);
        let (user_id, token) = register(&server, "pavel").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;

        tokio::join!(
            submit(&server, &token, user_id, topic_id, "listening", 0, 8),
            submit(&server, &token, user_id, topic_id, "listening", 1, 8),
        );

        let rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM student_progress WHERE user_id = ? AND topic_id = ? AND lesson_id IS NULL",
        )
        .bind(user_id)
        .bind(topic_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rows, 1);

        let res = server
            .get(&format!("/api/v1/progress/dashboard/{}", user_id))
            .authorization_bearer(&token)
            .await;
        let dashboard = res.json::<Value>()["data"][0].clone();
        assert_eq!(dashboard["total_topics"], 1);
        assert_eq!(dashboard["in_progress_topics"], 1);
    }
}

mod assessments {
    use super::*;

    async fn save(server: &TestServer, token: &str, user_id: i64, lesson_id: i64, ty: &str, correct: usize, total: usize) -> Value {
        let res = server
            .post("/api/v1/students/students")
            .authorization_bearer(token)
            .json(&json!({
                "user_id": user_id,
                "lesson_id": lesson_id,
                "type": ty,
                "practice_answered": answers(correct, total),
            }))
            .await;
        res.assert_status_ok();
        res.json::<Value>()["data"].clone()
    }

    #[tokio::test]
    async fn contribution_scales_with_accuracy_and_lesson_count() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "judy").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;
        let mut lessons = Vec::new();
        for i in 0..5 {
            lessons.push(create_lesson(&server, &token, topic_id, &format!("Lesson {}", i)).await);
        }

        // (4/10) × (100/5) / 4 = 2.0
        let saved = save(&server, &token, user_id, lessons[0], "reading", 4, 10).await;
        assert_eq!(saved["assessment"]["score"].as_f64(), Some(2.0));
        assert_eq!(saved["assessment"]["type"], "reading");
        assert_eq!(saved["lesson_status"], "in_progress");
        assert_eq!(saved["lesson_progress_percentage"].as_f64(), Some(25.0));

        // 같은 유형을 다시 저장하면 덮어쓴다
        let again = save(&server, &token, user_id, lessons[0], "reading", 10, 10).await;
        assert_eq!(again["assessment"]["id"], saved["assessment"]["id"]);
        assert_eq!(again["assessment"]["score"].as_f64(), Some(5.0));
        assert_eq!(again["completed_types"], json!(["reading"]));
    }

    #[tokio::test]
    async fn lesson_completes_only_with_all_four_types() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "ken").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;
        let lesson_id = create_lesson(&server, &token, topic_id, "First lesson").await;
        create_lesson(&server, &token, topic_id, "Second lesson").await;

        for ty in ["reading", "writing", "listening"] {
            save(&server, &token, user_id, lesson_id, ty, 0, 4).await;
        }

        let res = server
            .get(&format!("/api/v1/students/progress/{}/lesson/{}", user_id, lesson_id))
            .authorization_bearer(&token)
            .await;
        let lesson = res.json::<Value>()["data"].clone();
        assert_eq!(lesson["status"], "in_progress");
        assert_eq!(lesson["progress_percentage"].as_f64(), Some(75.0));
        assert_eq!(lesson["assessments"].as_array().map(Vec::len), Some(3));

        let summary_url = format!("/api/v1/students/progress/{}/topic/{}", user_id, topic_id);
        let summary = server.get(&summary_url).authorization_bearer(&token).await.json::<Value>();
        assert_eq!(summary["data"]["completed_lessons_count"], 0);
        assert_eq!(summary["data"]["topic_progress"]["reading"].as_f64(), Some(12.5));
        assert_eq!(summary["data"]["topic_progress"]["speaking"].as_f64(), Some(0.0));

        // 점수가 0이어도 네 번째 유형을 저장하면 레슨 완료
        let saved = save(&server, &token, user_id, lesson_id, "speaking", 0, 4).await;
        assert_eq!(saved["lesson_status"], "completed");

        let summary = server.get(&summary_url).authorization_bearer(&token).await.json::<Value>();
        assert_eq!(summary["data"]["completed_lessons_count"], 1);
        assert_eq!(summary["data"]["overall_percentage"].as_f64(), Some(50.0));
    }

    #[tokio::test]
    async fn concurrent_saves_complete_one_lesson_row() {
        let state = test_state().await;
        let pool = state.pool.clone();
        let server = test_server(state);
        let (user_id, token) = register(&server, "quinn").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;
        let lesson_id = create_lesson(&server, &token, topic_id, "Lesson").await;

        tokio::join!(
            save(&server, &token, user_id, lesson_id, "reading", 3, 4),
            save(&server, &token, user_id, lesson_id, "writing", 3, 4),
            save(&server, &token, user_id, lesson_id, "listening", 3, 4),
            save(&server, &token, user_id, lesson_id, "speaking", 3, 4),
        );

        let rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM student_progress WHERE user_id = ? AND lesson_id = ?",
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rows, 1);

        let res = server
            .get(&format!("/api/v1/students/progress/{}/lesson/{}", user_id, lesson_id))
            .authorization_bearer(&token)
            .await;
        let lesson = res.json::<Value>()["data"].clone();
        assert_eq!(lesson["status"], "completed");
        assert_eq!(lesson["progress_percentage"].as_f64(), Some(100.0));
        assert_eq!(lesson["assessments"].as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn unknown_lesson_is_not_found() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "leo").await;

        let res = server
            .post("/api/v1/students/students")
            .authorization_bearer(&token)
            .json(&json!({
                "user_id": user_id,
                "lesson_id": 404,
                "type": "writing",
                "practice_answered": answers(1, 1),
            }))
            .await;
        res.assert_status(StatusCode::NOT_FOUND);
    }
}

mod content {
    use super::*;

    #[tokio::test]
    async fn delete_is_blocked_by_dependents() {
        let server = test_server(test_state().await);
        let (_, token) = register(&server, "mallory").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;
        let lesson_id = create_lesson(&server, &token, topic_id, "Lesson").await;

        let res = server
            .delete(&format!("/api/v1/content/courses/{}", course_id))
            .authorization_bearer(&token)
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        assert!(res.json::<Value>()["message"].as_str().unwrap().contains("contains topics"));

        let res = server
            .delete(&format!("/api/v1/content/topics/{}", topic_id))
            .authorization_bearer(&token)
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        assert!(res.json::<Value>()["message"].as_str().unwrap().contains("contains lessons"));

        for url in [
            format!("/api/v1/content/lessons/{}", lesson_id),
            format!("/api/v1/content/topics/{}", topic_id),
            format!("/api/v1/content/courses/{}", course_id),
        ] {
            server.delete(&url).authorization_bearer(&token).await.assert_status_ok();
        }

        server
            .get(&format!("/api/v1/content/courses/{}", course_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lesson_json_fields_accept_encoded_strings() {
        let server = test_server(test_state().await);
        let (_, token) = register(&server, "nina").await;
        let course_id = create_course(&server, &token, "Course").await;
        let topic_id = create_topic(&server, &token, course_id, "Topic").await;

        let res = server
            .post("/api/v1/content/lessons")
            .authorization_bearer(&token)
            .json(&json!({
                "topic_id": topic_id,
                "title": "Past tense",
                "keywords": "[\"went\", \"saw\"]",
                "examples": [{ "sentence": "I went home." }],
            }))
            .await;
        res.assert_status_ok();
        let lesson = res.json::<Value>()["data"].clone();
        assert_eq!(lesson["keywords"], json!(["went", "saw"]));
        assert_eq!(lesson["examples"][0]["sentence"], "I went home.");

        let res = server
            .post("/api/v1/content/lessons")
            .authorization_bearer(&token)
            .json(&json!({ "topic_id": topic_id, "title": "Broken", "tags": "[\"a\"," }))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(res.json::<Value>()["errors"][0]["field"], "tags");
    }

    #[tokio::test]
    async fn partial_update_changes_only_sent_fields() {
        let server = test_server(test_state().await);
        let (_, token) = register(&server, "oscar").await;
        let course_id = create_course(&server, &token, "Daily Talk").await;

        let res = server
            .put(&format!("/api/v1/content/courses/{}", course_id))
            .authorization_bearer(&token)
            .json(&json!({ "title": "Daily Conversation", "is_published": true }))
            .await;
        res.assert_status_ok();
        let course = res.json::<Value>()["data"].clone();
        assert_eq!(course["slug"], "daily-conversation");
        assert_eq!(course["is_published"], true);
        assert_eq!(course["level"], "beginner");

        server
            .put(&format!("/api/v1/content/courses/{}", course_id))
            .authorization_bearer(&token)
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .put("/api/v1/content/courses/999")
            .authorization_bearer(&token)
            .json(&json!({ "title": "Ghost" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn course_modules_are_ordered() {
        let server = test_server(test_state().await);
        let (_, token) = register(&server, "peggy").await;
        let course_id = create_course(&server, &token, "Course").await;
        let first = create_topic(&server, &token, course_id, "First").await;
        let second = create_topic(&server, &token, course_id, "Second").await;
        create_lesson(&server, &token, second, "2-1").await;
        create_lesson(&server, &token, first, "1-1").await;
        create_lesson(&server, &token, first, "1-2").await;

        let res = server.get(&format!("/api/v1/course-modules/{}", course_id)).await;
        res.assert_status_ok();
        let tree = res.json::<Value>()["data"].clone();
        assert_eq!(tree["id"], course_id);
        assert_eq!(tree["topics"][0]["title"], "First");
        assert_eq!(tree["topics"][0]["lessons"][1]["title"], "1-2");
        assert_eq!(tree["topics"][1]["lessons"][0]["title"], "2-1");

        server
            .get("/api/v1/course-modules/999")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

mod admin {
    use super::*;

    #[tokio::test]
    async fn replace_content_swaps_topics_and_records_upload() {
        let server = test_server(test_state().await);
        let (user_id, token) = register(&server, "quinn").await;
        let course_id = create_course(&server, &token, "Course").await;
        create_topic(&server, &token, course_id, "Old topic").await;

        let res = server
            .put(&format!("/api/v1/admin/courses/{}/content", course_id))
            .authorization_bearer(&token)
            .json(&json!({
                "course": { "description": "Refreshed" },
                "topics": [
                    { "title": "New A", "lessons": [{ "title": "A1" }, { "title": "A2" }] },
                    { "title": "New B", "level": "intermediate", "lessons": [] },
                ],
            }))
            .await;
        res.assert_status_ok();
        let data = res.json::<Value>()["data"].clone();
        assert_eq!(data["topic_count"], 2);
        assert_eq!(data["lesson_count"], 2);

        let topics = server
            .get(&format!("/api/v1/content/courses/{}/topics", course_id))
            .await
            .json::<Value>();
        let titles: Vec<&str> = topics["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["New A", "New B"]);

        let uploads = server
            .get("/api/v1/admin/uploads")
            .authorization_bearer(&token)
            .await
            .json::<Value>();
        assert_eq!(uploads["data"][0]["uploaded_by"], user_id);
    }

    #[tokio::test]
    async fn failed_replace_rolls_back_everything() {
        let server = test_server(test_state().await);
        let (_, token) = register(&server, "rupert").await;
        let course_id = create_course(&server, &token, "Course").await;
        let kept = create_topic(&server, &token, course_id, "Kept topic").await;

        let res = server
            .put(&format!("/api/v1/admin/courses/{}/content", course_id))
            .authorization_bearer(&token)
            .json(&json!({
                "topics": [
                    { "title": "Fine", "lessons": [{ "title": "L" }] },
                    { "title": "Broken", "level": "expert" },
                ],
            }))
            .await;
        res.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let err: Value = res.json();
        assert_eq!(err["code"], "transaction_failed");
        assert!(err["message"].as_str().unwrap().starts_with("Transaction failed"));

        let topics = server
            .get(&format!("/api/v1/content/courses/{}/topics", course_id))
            .await
            .json::<Value>();
        assert_eq!(topics["data"].as_array().map(Vec::len), Some(1));
        assert_eq!(topics["data"][0]["id"], kept);

        let uploads = server
            .get("/api/v1/admin/uploads")
            .authorization_bearer(&token)
            .await
            .json::<Value>();
        assert_eq!(uploads["data"].as_array().map(Vec::len), Some(0));
    }
}

mod settings {
    use super::*;

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let server = test_server(test_state().await);
        let (_, token) = register(&server, "sybil").await;

        let body = json!({ "name": "daily_goal", "value": { "minutes": 20 } });
        server
            .post("/api/v1/settings")
            .authorization_bearer(&token)
            .json(&body)
            .await
            .assert_status_ok();

        let res = server
            .post("/api/v1/settings")
            .authorization_bearer(&token)
            .json(&body)
            .await;
        res.assert_status(StatusCode::CONFLICT);

        let res = server.get("/api/v1/settings/daily_goal").await;
        assert_eq!(res.json::<Value>()["data"]["value"]["minutes"], 20);
    }

    #[tokio::test]
    async fn encoded_value_must_be_valid_json() {
        let server = test_server(test_state().await);
        let (_, token) = register(&server, "trent").await;

        let res = server
            .post("/api/v1/settings")
            .authorization_bearer(&token)
            .json(&json!({ "name": "levels", "value": "[\"beginner\"" }))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(res.json::<Value>()["errors"][0]["field"], "value");

        let res = server
            .post("/api/v1/settings")
            .authorization_bearer(&token)
            .json(&json!({ "name": "levels", "value": "[\"beginner\", \"advanced\"]" }))
            .await;
        res.assert_status_ok();
        assert_eq!(res.json::<Value>()["data"]["value"][1], "advanced");

        server
            .put("/api/v1/settings/missing")
            .authorization_bearer(&token)
            .json(&json!({ "description": "nope" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn login_refresh_and_logout() {
        let server = test_server(test_state().await);
        let (user_id, _) = register(&server, "uma").await;

        let res = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": "uma", "password": "correct-horse" }))
            .await;
        res.assert_status_ok();
        let data = res.json::<Value>()["data"].clone();
        let access = data["access_token"].as_str().unwrap().to_string();
        let refresh = data["refresh_token"].as_str().unwrap().to_string();

        let me = server.get("/api/v1/auth/me").authorization_bearer(&access).await;
        assert_eq!(me.json::<Value>()["data"]["id"], user_id);
        assert_eq!(me.json::<Value>()["data"]["role"], "student");

        let res = server
            .post("/api/v1/auth/refresh")
            .json(&json!({ "refresh_token": refresh }))
            .await;
        res.assert_status_ok();

        // 회전된 토큰은 다시 쓸 수 없음
        server
            .post("/api/v1/auth/refresh")
            .json(&json!({ "refresh_token": refresh }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": "uma", "password": "wrong-horse" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .post("/api/v1/auth/logout")
            .authorization_bearer(&access)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn refresh_token_is_not_accepted_as_bearer() {
        let server = test_server(test_state().await);
        register(&server, "wendy").await;

        let res = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": "wendy", "password": "correct-horse" }))
            .await;
        let refresh = res.json::<Value>()["data"]["refresh_token"]
            .as_str()
            .unwrap()
            .to_string();

        server
            .get("/api/v1/auth/me")
            .authorization_bearer(&refresh)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_role_reaches_other_users() {
        let state = test_state().await;
        let pool = state.pool.clone();
        let server = test_server(state);
        let (student_id, student_token) = register(&server, "xena").await;
        let (admin_id, _) = register(&server, "yuri").await;

        server
            .get("/api/v1/users")
            .authorization_bearer(&student_token)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // 첫 관리자는 DB에서 직접 지정하고, 역할은 다음 로그인 토큰부터 적용
        sqlx::query("UPDATE users SET role = 'admin' WHERE id = ?")
            .bind(admin_id)
            .execute(&pool)
            .await
            .unwrap();
        let res = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": "yuri", "password": "correct-horse" }))
            .await;
        let admin_token = res.json::<Value>()["data"]["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        server
            .get(&format!("/api/v1/progress/dashboard/{}", student_id))
            .authorization_bearer(&admin_token)
            .await
            .assert_status_ok();

        let res = server
            .get("/api/v1/users")
            .authorization_bearer(&admin_token)
            .await;
        res.assert_status_ok();
        assert_eq!(res.json::<Value>()["data"].as_array().map(Vec::len), Some(2));

        let res = server
            .put(&format!("/api/v1/users/{}/role", student_id))
            .authorization_bearer(&admin_token)
            .json(&json!({ "role": "admin" }))
            .await;
        res.assert_status_ok();
        assert_eq!(res.json::<Value>()["data"]["role"], "admin");

        server
            .put(&format!("/api/v1/users/{}/role", admin_id))
            .authorization_bearer(&student_token)
            .json(&json!({ "role": "student" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let server = test_server(test_state().await);
        register(&server, "victor").await;

        server
            .post("/api/v1/auth/register")
            .json(&json!({ "username": "victor", "password": "another-pass" }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}

#[tokio::test]
async fn health_check_responds() {
    let server = test_server(test_state().await);
    let res = server.get("/api/v1/health").await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>(), json!({ "status": "ok" }));
}
