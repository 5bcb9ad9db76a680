//! # 평가(Assessment) 모델
//!
//! 레슨 하나에 대한 평가 유형(읽기/쓰기/듣기/말하기)별 결과 기록입니다.
//! 평가 행은 레슨 단위 `student_progress` 행에 연결되며,
//! (student_progress_id, user_id, type) 조합당 하나만 존재합니다.

use super::ProgressStatus;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// 레슨 평가 유형. 레슨 하나는 4가지 유형을 모두 완료해야 완료로 간주됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum AssessmentType {
    Reading,
    Writing,
    Listening,
    Speaking,
}

impl AssessmentType {
    pub const ALL: [AssessmentType; 4] = [
        AssessmentType::Reading,
        AssessmentType::Writing,
        AssessmentType::Listening,
        AssessmentType::Speaking,
    ];
}

/// 문항별 결과: `assessments.practice_answered` JSON 배열의 원소
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub prompt: String,
    #[serde(default)]
    pub user_answer: String,
    #[serde(default)]
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Assessment {
    pub id: i64,
    pub student_progress_id: i64,
    pub user_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub assessment_type: AssessmentType,
    pub practice_answered: Json<Vec<AnswerRecord>>,
    /// 이 평가가 토픽 전체 진도에 기여하는 점수 (정확도가 아님)
    pub score: f64,
    pub feedback: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// `POST /students/students` 요청 본문
#[derive(Debug, Deserialize)]
pub struct SaveAssessmentRequest {
    pub user_id: i64,
    pub lesson_id: i64,
    #[serde(rename = "type")]
    pub assessment_type: AssessmentType,
    pub practice_answered: Vec<AnswerRecord>,
    pub feedback: Option<String>,
}

/// 평가 저장 결과
#[derive(Debug, Serialize)]
pub struct SaveAssessmentResponse {
    pub student_progress_id: i64,
    pub assessment: Assessment,
    pub lesson_status: ProgressStatus,
    pub lesson_progress_percentage: f64,
    pub completed_types: Vec<AssessmentType>,
}

/// 레슨 진도 조회 응답
#[derive(Debug, Serialize)]
pub struct LessonProgressView {
    pub user_id: i64,
    pub lesson_id: i64,
    pub status: ProgressStatus,
    pub progress_percentage: f64,
    pub assessments: Vec<Assessment>,
}

/// 토픽의 레슨 평가 집계에 쓰는 (lesson_id, type, score) 행
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LessonAssessmentRow {
    pub lesson_id: i64,
    #[sqlx(rename = "type")]
    pub assessment_type: AssessmentType,
    pub score: f64,
}

/// 유형별 토픽 진도 (각 유형 최대 25점)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeProgress {
    pub reading: f64,
    pub writing: f64,
    pub listening: f64,
    pub speaking: f64,
}

/// 레슨 평가 기반 토픽 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicLessonSummary {
    pub topic_id: i64,
    pub total_lessons: i64,
    pub completed_lessons_count: i64,
    pub topic_progress: TypeProgress,
    pub overall_percentage: f64,
    /// 저장된 평가 기여 점수의 합 (정확도 반영)
    pub earned_points: f64,
}
