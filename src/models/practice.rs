//! # 연습 문제 시도(Practice Attempt) 모델
//!
//! 토픽의 섹션별 연습 문제(듣기/말하기/빈칸 채우기) 제출 한 건을 표현합니다.
//! (user, topic, practice_type, section_index) 조합당 시도는 한 번만 허용됩니다.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// 연습 문제 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum PracticeType {
    Listening,
    Speaking,
    FillInBlank,
}

/// 문항별 답안: `practice_attempts.answers` JSON 배열의 원소
///
/// 클라이언트마다 필드 구성이 달라 모든 항목이 선택적입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PracticeAttempt {
    pub id: i64,
    pub user_id: i64,
    pub topic_id: i64,
    pub practice_type: PracticeType,
    pub section_index: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub score: f64,
    pub time_spent: i64,
    pub answers: Json<Vec<PracticeAnswer>>,
    pub created_at: String,
}

/// `POST /practice/submit` 요청 본문
///
/// 개수 필드는 u32이므로 음수는 역직렬화 단계에서 거부됩니다.
#[derive(Debug, Deserialize)]
pub struct SubmitPracticeRequest {
    pub user_id: i64,
    pub topic_id: i64,
    pub practice_type: PracticeType,
    pub section_index: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    #[serde(default)]
    pub time_spent: u32,
    #[serde(default)]
    pub answers: Vec<PracticeAnswer>,
}

/// 제출 결과
#[derive(Debug, Serialize)]
pub struct PracticeResult {
    pub attempt_id: i64,
    pub score: f64,
    pub passed: bool,
}

/// `GET /practice/topic-score/...` 응답
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicScore {
    pub average_score: f64,
    pub total_practices: i64,
    pub passed_practices: i64,
    pub completion_rate: f64,
}
