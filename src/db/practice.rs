//! 연습 문제 시도 쿼리.

use crate::error::AppError;
use crate::models::*;
use sqlx::types::Json;
use sqlx::SqlitePool;

/// 연습 문제 시도 하나를 저장할 때 쓰는 값
#[derive(Debug)]
pub struct NewAttempt<'a> {
    pub user_id: i64,
    pub topic_id: i64,
    pub practice_type: PracticeType,
    pub section_index: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub score: f64,
    pub time_spent: i64,
    pub answers: &'a [PracticeAnswer],
}

pub async fn find_attempt_id(
    pool: &SqlitePool,
    user_id: i64,
    topic_id: i64,
    practice_type: PracticeType,
    section_index: i64,
) -> Result<Option<i64>, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id FROM practice_attempts
        WHERE user_id = ? AND topic_id = ? AND practice_type = ? AND section_index = ?
        "#,
    )
    .bind(user_id)
    .bind(topic_id)
    .bind(practice_type)
    .bind(section_index)
    .fetch_optional(pool)
    .await?;

    Ok(id)
}

/// 시도를 저장합니다.
///
/// 같은 (user, topic, practice_type, section_index)가 이미 있으면
/// UNIQUE 제약 위반 `sqlx::Error`가 그대로 반환됩니다.
pub async fn insert_attempt(pool: &SqlitePool, attempt: &NewAttempt<'_>) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO practice_attempts (user_id, topic_id, practice_type, section_index,
                                       total_questions, correct_answers, score, time_spent, answers)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(attempt.user_id)
    .bind(attempt.topic_id)
    .bind(attempt.practice_type)
    .bind(attempt.section_index)
    .bind(attempt.total_questions)
    .bind(attempt.correct_answers)
    .bind(attempt.score)
    .bind(attempt.time_spent)
    .bind(Json(attempt.answers))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// (user, topic)의 모든 시도 점수
pub async fn attempt_scores(
    pool: &SqlitePool,
    user_id: i64,
    topic_id: i64,
) -> Result<Vec<f64>, AppError> {
    let scores = sqlx::query_scalar::<_, f64>(
        "SELECT score FROM practice_attempts WHERE user_id = ? AND topic_id = ? ORDER BY id",
    )
    .bind(user_id)
    .bind(topic_id)
    .fetch_all(pool)
    .await?;

    Ok(scores)
}

pub async fn list_attempts(
    pool: &SqlitePool,
    user_id: i64,
    topic_id: i64,
) -> Result<Vec<PracticeAttempt>, AppError> {
    let attempts = sqlx::query_as::<_, PracticeAttempt>(
        r#"
        SELECT id, user_id, topic_id, practice_type, section_index, total_questions,
               correct_answers, score, time_spent, answers, created_at
        FROM practice_attempts
        WHERE user_id = ? AND topic_id = ?
        ORDER BY id DESC
        "#,
    )
    .bind(user_id)
    .bind(topic_id)
    .fetch_all(pool)
    .await?;

    Ok(attempts)
}
