//! 레슨 평가 쿼리.
//!
//! 평가는 (student_progress_id, user_id, type) UNIQUE 제약을 기준으로
//! `ON CONFLICT ... DO UPDATE`로 upsert합니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::types::Json;
use sqlx::{Executor, Sqlite, SqlitePool};

const ASSESSMENT_COLUMNS: &str = "id, student_progress_id, user_id, type, practice_answered, \
     score, feedback, created_at, updated_at";

pub async fn upsert_assessment<'e, E>(
    executor: E,
    student_progress_id: i64,
    user_id: i64,
    assessment_type: AssessmentType,
    practice_answered: &[AnswerRecord],
    score: f64,
    feedback: &str,
) -> Result<Assessment, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        INSERT INTO assessments (student_progress_id, user_id, type, practice_answered, score, feedback)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (student_progress_id, user_id, type) DO UPDATE SET
            practice_answered = excluded.practice_answered,
            score = excluded.score,
            feedback = excluded.feedback,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        RETURNING {}
        "#,
        ASSESSMENT_COLUMNS
    );
    let assessment = sqlx::query_as::<_, Assessment>(&sql)
        .bind(student_progress_id)
        .bind(user_id)
        .bind(assessment_type)
        .bind(Json(practice_answered))
        .bind(score)
        .bind(feedback)
        .fetch_one(executor)
        .await?;

    Ok(assessment)
}

pub async fn list_assessments(
    pool: &SqlitePool,
    student_progress_id: i64,
) -> Result<Vec<Assessment>, AppError> {
    let sql = format!(
        "SELECT {} FROM assessments WHERE student_progress_id = ? ORDER BY id",
        ASSESSMENT_COLUMNS
    );
    let assessments = sqlx::query_as::<_, Assessment>(&sql)
        .bind(student_progress_id)
        .fetch_all(pool)
        .await?;

    Ok(assessments)
}

/// 레슨 진도 행에 저장된 평가 유형들
pub async fn completed_types<'e, E>(
    executor: E,
    student_progress_id: i64,
) -> Result<Vec<AssessmentType>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let types = sqlx::query_scalar::<_, AssessmentType>(
        "SELECT type FROM assessments WHERE student_progress_id = ?",
    )
    .bind(student_progress_id)
    .fetch_all(executor)
    .await?;

    Ok(types)
}

/// 사용자가 토픽의 레슨들에서 저장한 모든 평가 (lesson_id, type, score)
pub async fn topic_assessment_rows(
    pool: &SqlitePool,
    user_id: i64,
    topic_id: i64,
) -> Result<Vec<LessonAssessmentRow>, AppError> {
    let rows = sqlx::query_as::<_, LessonAssessmentRow>(
        r#"
        SELECT sp.lesson_id AS lesson_id, a.type AS type, a.score AS score
        FROM assessments a
        JOIN student_progress sp ON sp.id = a.student_progress_id
        WHERE sp.user_id = ? AND sp.topic_id = ? AND sp.lesson_id IS NOT NULL
        "#,
    )
    .bind(user_id)
    .bind(topic_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
