//! # 학습 진도(Student Progress) 모델
//!
//! `student_progress` 한 행은 (user, course, topic, lesson?) 조합의 진도를 나타냅니다.
//! - `lesson_id`가 NULL: 토픽 단위 행 (연습 문제 시도 횟수 기반)
//! - `lesson_id`가 있음: 레슨 단위 행 (4가지 평가 유형 기반)

use serde::{Deserialize, Serialize};

/// 진도 상태 (not_started → in_progress → completed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudentProgress {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub topic_id: i64,
    pub lesson_id: Option<i64>,
    pub status: ProgressStatus,
    pub is_completed: bool,
    pub progress_percentage: f64,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub last_accessed: String,
    pub created_at: String,
    pub updated_at: String,
}

/// 진도 목록 조회용 행 (코스/토픽 제목 포함)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProgressListItem {
    pub id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub topic_id: i64,
    pub topic_title: String,
    pub lesson_id: Option<i64>,
    pub status: ProgressStatus,
    pub progress_percentage: f64,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub last_accessed: String,
}

/// 진도 upsert 시 쓰는 값. `started_at`/`completed_at`은 DB 계층이 결정합니다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressWrite {
    pub user_id: i64,
    pub course_id: i64,
    pub topic_id: i64,
    pub lesson_id: Option<i64>,
    pub status: ProgressStatus,
    pub progress_percentage: f64,
}

#[derive(Debug, Deserialize)]
pub struct ProgressFilter {
    #[serde(alias = "courseId")]
    pub course_id: Option<i64>,
}

/// `PUT /progress/student/{user_id}/topic/{topic_id}` 요청 본문
#[derive(Debug, Deserialize)]
pub struct UpdateTopicProgressRequest {
    pub status: ProgressStatus,
    pub progress_percentage: Option<f64>,
}

/// 토픽 진도 조회 응답. 아직 기록이 없으면 `not_started`로 채웁니다.
#[derive(Debug, Serialize)]
pub struct TopicProgressView {
    pub user_id: i64,
    pub topic_id: i64,
    pub status: ProgressStatus,
    pub progress_percentage: f64,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub last_accessed: Option<String>,
}

impl TopicProgressView {
    pub fn not_started(user_id: i64, topic_id: i64) -> Self {
        Self {
            user_id,
            topic_id,
            status: ProgressStatus::NotStarted,
            progress_percentage: 0.0,
            started_at: None,
            completed_at: None,
            last_accessed: None,
        }
    }
}

impl From<StudentProgress> for TopicProgressView {
    fn from(row: StudentProgress) -> Self {
        Self {
            user_id: row.user_id,
            topic_id: row.topic_id,
            status: row.status,
            progress_percentage: row.progress_percentage,
            started_at: row.started_at,
            completed_at: row.completed_at,
            last_accessed: Some(row.last_accessed),
        }
    }
}

/// 대시보드의 코스별 요약
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DashboardCourse {
    pub course_id: i64,
    pub course_title: String,
    pub total_topics: i64,
    pub completed_topics: i64,
    pub in_progress_topics: i64,
    pub average_progress: f64,
    pub last_accessed: Option<String>,
}
