//! # 학습 진도 쿼리 모듈
//!
//! `student_progress` 행의 upsert 규칙:
//! - `status`, `is_completed`, `progress_percentage`는 매번 덮어씁니다.
//! - `last_accessed`는 쓸 때마다 현재 시각으로 갱신합니다.
//! - `started_at`은 처음으로 `not_started`가 아닌 상태가 될 때 한 번만 기록합니다.
//! - `completed_at`은 `completed`로 쓸 때마다 현재 시각, 그 외에는 NULL입니다.
//!
//! `lesson_id`는 NULL일 수 있으므로 조회 조건에 `IS ?`를 사용합니다.
//! 행의 유일성은 마이그레이션의 두 부분 UNIQUE 인덱스가 보장합니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::{Executor, Sqlite, SqlitePool};

const PROGRESS_COLUMNS: &str = "id, user_id, course_id, topic_id, lesson_id, status, is_completed, \
     progress_percentage, started_at, completed_at, last_accessed, created_at, updated_at";

pub async fn find_progress(
    pool: &SqlitePool,
    user_id: i64,
    topic_id: i64,
    lesson_id: Option<i64>,
) -> Result<Option<StudentProgress>, AppError> {
    let sql = format!(
        "SELECT {} FROM student_progress WHERE user_id = ? AND topic_id = ? AND lesson_id IS ?",
        PROGRESS_COLUMNS
    );
    let row = sqlx::query_as::<_, StudentProgress>(&sql)
        .bind(user_id)
        .bind(topic_id)
        .bind(lesson_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// 진도 행을 쓰고, 쓴 결과를 반환합니다.
///
/// 한 문장의 `INSERT ... ON CONFLICT DO UPDATE`입니다. 충돌 대상은
/// `lesson_id` 유무에 따라 두 부분 UNIQUE 인덱스 중 하나입니다.
pub async fn upsert_progress<'e, E>(
    executor: E,
    write: &ProgressWrite,
) -> Result<StudentProgress, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let conflict_target = match write.lesson_id {
        Some(_) => "(user_id, topic_id, lesson_id) WHERE lesson_id IS NOT NULL",
        None => "(user_id, topic_id) WHERE lesson_id IS NULL",
    };
    let sql = format!(
        r#"
        INSERT INTO student_progress (user_id, course_id, topic_id, lesson_id, status,
                                      is_completed, progress_percentage,
                                      started_at, completed_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7,
                CASE WHEN ?5 <> 'not_started' THEN strftime('%Y-%m-%dT%H:%M:%fZ', 'now') END,
                CASE WHEN ?5 = 'completed' THEN strftime('%Y-%m-%dT%H:%M:%fZ', 'now') END)
        ON CONFLICT {} DO UPDATE SET
            status = excluded.status,
            is_completed = excluded.is_completed,
            progress_percentage = excluded.progress_percentage,
            started_at = COALESCE(student_progress.started_at, excluded.started_at),
            completed_at = excluded.completed_at,
            last_accessed = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        RETURNING {}
        "#,
        conflict_target, PROGRESS_COLUMNS
    );

    let row = sqlx::query_as::<_, StudentProgress>(&sql)
        .bind(write.user_id)
        .bind(write.course_id)
        .bind(write.topic_id)
        .bind(write.lesson_id)
        .bind(write.status)
        .bind(write.status == ProgressStatus::Completed)
        .bind(write.progress_percentage)
        .fetch_one(executor)
        .await?;

    Ok(row)
}

/// 사용자의 토픽 단위 진도 목록. `course_id`가 있으면 해당 코스만 조회합니다.
pub async fn list_topic_progress(
    pool: &SqlitePool,
    user_id: i64,
    course_id: Option<i64>,
) -> Result<Vec<ProgressListItem>, AppError> {
    let rows = sqlx::query_as::<_, ProgressListItem>(
        r#"
        SELECT sp.id, sp.course_id, c.title AS course_title, sp.topic_id, t.title AS topic_title,
               sp.lesson_id, sp.status, sp.progress_percentage, sp.started_at, sp.completed_at,
               sp.last_accessed
        FROM student_progress sp
        JOIN courses c ON c.id = sp.course_id
        JOIN topics t ON t.id = sp.topic_id
        WHERE sp.user_id = ?1
          AND sp.lesson_id IS NULL
          AND (?2 IS NULL OR sp.course_id = ?2)
        ORDER BY c.id, t.topic_index, t.id
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// 사용자가 진도를 기록한 코스별 요약
///
/// 평균 진도는 코스의 전체 토픽 수로 나눕니다 (시작하지 않은 토픽은 0%).
pub async fn dashboard(pool: &SqlitePool, user_id: i64) -> Result<Vec<DashboardCourse>, AppError> {
    let rows = sqlx::query_as::<_, DashboardCourse>(
        r#"
        SELECT course_id, course_title, total_topics, completed_topics, in_progress_topics,
               ROUND(progress_sum / MAX(total_topics, 1), 2) AS average_progress,
               last_accessed
        FROM (
            SELECT c.id AS course_id,
                   c.title AS course_title,
                   (SELECT COUNT(*) FROM topics t WHERE t.course_id = c.id) AS total_topics,
                   COUNT(CASE WHEN sp.status = 'completed' THEN 1 END) AS completed_topics,
                   COUNT(CASE WHEN sp.status = 'in_progress' THEN 1 END) AS in_progress_topics,
                   COALESCE(SUM(sp.progress_percentage), 0.0) AS progress_sum,
                   MAX(sp.last_accessed) AS last_accessed
            FROM student_progress sp
            JOIN courses c ON c.id = sp.course_id
            WHERE sp.user_id = ? AND sp.lesson_id IS NULL
            GROUP BY c.id, c.title
        )
        ORDER BY last_accessed DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
