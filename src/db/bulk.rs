//! # 코스 콘텐츠 일괄 교체
//!
//! 코스의 토픽/레슨 전체를 삭제하고 요청 본문으로 다시 채우는 작업입니다.
//! 모든 문장은 하나의 트랜잭션에서 실행되며, 중간에 하나라도 실패하면
//! 트랜잭션이 커밋되지 않고 롤백됩니다 (`Transaction`이 drop될 때 자동 롤백).
//!
//! 토픽을 삭제하면 FK CASCADE로 그 토픽의 진도/연습 기록도 함께 삭제됩니다.

use super::content::apply_course_patch;
use crate::error::AppError;
use crate::models::*;
use sqlx::types::Json;
use sqlx::SqlitePool;

/// 코스 콘텐츠를 교체하고 교체 이력 ID를 반환합니다.
///
/// 에러는 `sqlx::Error` 그대로 돌려주어, 호출하는 쪽이 트랜잭션 실패로 보고할 수 있게 합니다.
pub async fn replace_course_content(
    pool: &SqlitePool,
    course_id: i64,
    uploaded_by: i64,
    payload: &ContentPayload,
) -> Result<ReplaceContentResponse, sqlx::Error> {
    let mut tx = pool.begin().await?;

    if let Some(fields) = &payload.course {
        let patch = CoursePatch::from(fields);
        if !patch.is_empty() {
            apply_course_patch(&mut *tx, course_id, &patch).await?;
        }
    }

    sqlx::query("DELETE FROM lessons WHERE topic_id IN (SELECT id FROM topics WHERE course_id = ?)")
        .bind(course_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM topics WHERE course_id = ?")
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

    for (topic_index, topic) in payload.topics.iter().enumerate() {
        let topic_id = sqlx::query(
            r#"
            INSERT INTO topics (course_id, title, description, level, topic_index)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(course_id)
        .bind(&topic.title)
        .bind(&topic.description)
        .bind(&topic.level)
        .bind(topic_index as i64)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for (lesson_index, lesson) in topic.lessons.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO lessons (topic_id, title, content, lesson_index,
                                     examples, keywords, tags, skills_covered)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(topic_id)
            .bind(&lesson.title)
            .bind(&lesson.content)
            .bind(lesson_index as i64)
            .bind(Json(&lesson.examples))
            .bind(Json(&lesson.keywords))
            .bind(Json(&lesson.tags))
            .bind(Json(&lesson.skills_covered))
            .execute(&mut *tx)
            .await?;
        }
    }

    let topic_count = payload.topics.len() as i64;
    let lesson_count = payload.lesson_count() as i64;

    let upload_id = sqlx::query(
        r#"
        INSERT INTO admin_content_uploads (course_id, uploaded_by, topic_count, lesson_count, payload)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(course_id)
    .bind(uploaded_by)
    .bind(topic_count)
    .bind(lesson_count)
    .bind(Json(payload))
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    tx.commit().await?;

    Ok(ReplaceContentResponse {
        upload_id,
        topic_count,
        lesson_count,
    })
}

pub async fn list_uploads(pool: &SqlitePool) -> Result<Vec<ContentUpload>, AppError> {
    let uploads = sqlx::query_as::<_, ContentUpload>(
        r#"
        SELECT id, course_id, uploaded_by, topic_count, lesson_count, payload, created_at
        FROM admin_content_uploads
        ORDER BY id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(uploads)
}
