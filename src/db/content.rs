//! # 코스/토픽/레슨 데이터베이스 쿼리 모듈
//!
//! `courses`, `topics`, `lessons` 테이블에 대한 CRUD 쿼리 함수들입니다.
//!
//! 부분 수정(PATCH)은 `*Patch` 구조체에 들어 있는 필드만으로
//! `sqlx::QueryBuilder`를 사용해 UPDATE 문을 만듭니다.

use super::NOW;
use crate::error::AppError;
use crate::models::*;
use sqlx::types::Json;
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;

const COURSE_COLUMNS: &str =
    "id, title, slug, description, level, is_published, created_at, updated_at";
const TOPIC_COLUMNS: &str =
    "id, course_id, title, description, level, topic_index, created_at, updated_at";
const LESSON_COLUMNS: &str = "id, topic_id, title, content, lesson_index, examples, keywords, \
                              tags, skills_covered, created_at, updated_at";

// ── 코스(Course) ──

pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<Course>, AppError> {
    let sql = format!("SELECT {} FROM courses ORDER BY id", COURSE_COLUMNS);
    let courses = sqlx::query_as::<_, Course>(&sql).fetch_all(pool).await?;
    Ok(courses)
}

pub async fn get_course(pool: &SqlitePool, id: i64) -> Result<Option<Course>, AppError> {
    let sql = format!("SELECT {} FROM courses WHERE id = ?", COURSE_COLUMNS);
    let course = sqlx::query_as::<_, Course>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(course)
}

pub async fn create_course(
    pool: &SqlitePool,
    req: &CreateCourseRequest,
    slug: &str,
) -> Result<Course, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO courses (title, slug, description, level, is_published)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&req.title)
    .bind(slug)
    .bind(&req.description)
    .bind(req.level)
    .bind(req.is_published)
    .execute(pool)
    .await?;

    get_course(pool, result.last_insert_rowid())
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created course".to_string()))
}

/// 코스 패치를 UPDATE 문 하나로 실행합니다.
///
/// 풀과 트랜잭션 양쪽에서 쓸 수 있도록 Executor를 받습니다.
/// 제목이 바뀌면 slug도 함께 갱신합니다. 영향받은 행 수를 반환합니다.
pub async fn apply_course_patch<'e, E>(
    executor: E,
    id: i64,
    patch: &CoursePatch,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("UPDATE courses SET updated_at = {}", NOW));

    if let Some(title) = &patch.title {
        query.push(", title = ").push_bind(title.clone());
        query.push(", slug = ").push_bind(slug::slugify(title));
    }
    if let Some(description) = &patch.description {
        query.push(", description = ").push_bind(description.clone());
    }
    if let Some(level) = patch.level {
        query.push(", level = ").push_bind(level);
    }
    if let Some(is_published) = patch.is_published {
        query.push(", is_published = ").push_bind(is_published);
    }

    query.push(" WHERE id = ").push_bind(id);

    let result = query.build().execute(executor).await?;
    Ok(result.rows_affected())
}

/// 코스를 수정합니다. 코스가 없으면 `Ok(None)`.
pub async fn update_course(
    pool: &SqlitePool,
    id: i64,
    patch: &CoursePatch,
) -> Result<Option<Course>, AppError> {
    if apply_course_patch(pool, id, patch).await? == 0 {
        return Ok(None);
    }
    get_course(pool, id).await
}

pub async fn delete_course(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_topics(pool: &SqlitePool, course_id: i64) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM topics WHERE course_id = ?")
        .bind(course_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

// ── 토픽(Topic) ──

pub async fn list_topics(pool: &SqlitePool, course_id: i64) -> Result<Vec<Topic>, AppError> {
    let sql = format!(
        "SELECT {} FROM topics WHERE course_id = ? ORDER BY topic_index, id",
        TOPIC_COLUMNS
    );
    let topics = sqlx::query_as::<_, Topic>(&sql)
        .bind(course_id)
        .fetch_all(pool)
        .await?;
    Ok(topics)
}

pub async fn get_topic(pool: &SqlitePool, id: i64) -> Result<Option<Topic>, AppError> {
    let sql = format!("SELECT {} FROM topics WHERE id = ?", TOPIC_COLUMNS);
    let topic = sqlx::query_as::<_, Topic>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(topic)
}

/// 새 토픽을 생성합니다. `topic_index`가 없으면 코스의 마지막 다음 순서를 씁니다.
pub async fn create_topic(pool: &SqlitePool, req: &CreateTopicRequest) -> Result<Topic, AppError> {
    let topic_index = match req.topic_index {
        Some(index) => index,
        None => {
            sqlx::query_scalar::<_, i64>(
                "SELECT COALESCE(MAX(topic_index), -1) + 1 FROM topics WHERE course_id = ?",
            )
            .bind(req.course_id)
            .fetch_one(pool)
            .await?
        }
    };

    let result = sqlx::query(
        r#"
        INSERT INTO topics (course_id, title, description, level, topic_index)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(req.course_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.level)
    .bind(topic_index)
    .execute(pool)
    .await?;

    get_topic(pool, result.last_insert_rowid())
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created topic".to_string()))
}

pub async fn update_topic(
    pool: &SqlitePool,
    id: i64,
    patch: &TopicPatch,
) -> Result<Option<Topic>, AppError> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("UPDATE topics SET updated_at = {}", NOW));

    if let Some(title) = &patch.title {
        query.push(", title = ").push_bind(title);
    }
    if let Some(description) = &patch.description {
        query.push(", description = ").push_bind(description);
    }
    if let Some(level) = patch.level {
        query.push(", level = ").push_bind(level);
    }
    if let Some(topic_index) = patch.topic_index {
        query.push(", topic_index = ").push_bind(topic_index);
    }
    query.push(" WHERE id = ").push_bind(id);

    if query.build().execute(pool).await?.rows_affected() == 0 {
        return Ok(None);
    }
    get_topic(pool, id).await
}

pub async fn delete_topic(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM topics WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_lessons(pool: &SqlitePool, topic_id: i64) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE topic_id = ?")
        .bind(topic_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

// ── 레슨(Lesson) ──

pub async fn list_lessons(pool: &SqlitePool, topic_id: i64) -> Result<Vec<Lesson>, AppError> {
    let sql = format!(
        "SELECT {} FROM lessons WHERE topic_id = ? ORDER BY lesson_index, id",
        LESSON_COLUMNS
    );
    let lessons = sqlx::query_as::<_, Lesson>(&sql)
        .bind(topic_id)
        .fetch_all(pool)
        .await?;
    Ok(lessons)
}

pub async fn get_lesson(pool: &SqlitePool, id: i64) -> Result<Option<Lesson>, AppError> {
    let sql = format!("SELECT {} FROM lessons WHERE id = ?", LESSON_COLUMNS);
    let lesson = sqlx::query_as::<_, Lesson>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(lesson)
}

pub async fn create_lesson(
    pool: &SqlitePool,
    req: &CreateLessonRequest,
    fields: &LessonFields,
) -> Result<Lesson, AppError> {
    let lesson_index = match req.lesson_index {
        Some(index) => index,
        None => {
            sqlx::query_scalar::<_, i64>(
                "SELECT COALESCE(MAX(lesson_index), -1) + 1 FROM lessons WHERE topic_id = ?",
            )
            .bind(req.topic_id)
            .fetch_one(pool)
            .await?
        }
    };

    let result = sqlx::query(
        r#"
        INSERT INTO lessons (topic_id, title, content, lesson_index,
                             examples, keywords, tags, skills_covered)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(req.topic_id)
    .bind(&req.title)
    .bind(&req.content)
    .bind(lesson_index)
    .bind(Json(&fields.examples))
    .bind(Json(&fields.keywords))
    .bind(Json(&fields.tags))
    .bind(Json(&fields.skills_covered))
    .execute(pool)
    .await?;

    get_lesson(pool, result.last_insert_rowid())
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created lesson".to_string()))
}

pub async fn update_lesson(
    pool: &SqlitePool,
    id: i64,
    patch: &ResolvedLessonPatch,
) -> Result<Option<Lesson>, AppError> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("UPDATE lessons SET updated_at = {}", NOW));

    if let Some(title) = &patch.title {
        query.push(", title = ").push_bind(title);
    }
    if let Some(content) = &patch.content {
        query.push(", content = ").push_bind(content);
    }
    if let Some(lesson_index) = patch.lesson_index {
        query.push(", lesson_index = ").push_bind(lesson_index);
    }
    if let Some(examples) = &patch.examples {
        query.push(", examples = ").push_bind(Json(examples));
    }
    if let Some(keywords) = &patch.keywords {
        query.push(", keywords = ").push_bind(Json(keywords));
    }
    if let Some(tags) = &patch.tags {
        query.push(", tags = ").push_bind(Json(tags));
    }
    if let Some(skills) = &patch.skills_covered {
        query.push(", skills_covered = ").push_bind(Json(skills));
    }
    query.push(" WHERE id = ").push_bind(id);

    if query.build().execute(pool).await?.rows_affected() == 0 {
        return Ok(None);
    }
    get_lesson(pool, id).await
}

pub async fn delete_lesson(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM lessons WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// 코스 하나의 토픽과 레슨을 순서대로 묶어 반환합니다.
pub async fn get_course_modules(
    pool: &SqlitePool,
    course_id: i64,
) -> Result<Option<CourseModules>, AppError> {
    let Some(course) = get_course(pool, course_id).await? else {
        return Ok(None);
    };

    let topics = list_topics(pool, course_id).await?;

    let sql = r#"
        SELECT l.id, l.topic_id, l.title, l.content, l.lesson_index, l.examples, l.keywords,
               l.tags, l.skills_covered, l.created_at, l.updated_at
        FROM lessons l
        JOIN topics t ON t.id = l.topic_id
        WHERE t.course_id = ?
        ORDER BY l.lesson_index, l.id
    "#;
    let lessons = sqlx::query_as::<_, Lesson>(sql)
        .bind(course_id)
        .fetch_all(pool)
        .await?;

    let mut by_topic: HashMap<i64, Vec<Lesson>> = HashMap::new();
    for lesson in lessons {
        by_topic.entry(lesson.topic_id).or_default().push(lesson);
    }

    let topics = topics
        .into_iter()
        .map(|topic| {
            let lessons = by_topic.remove(&topic.id).unwrap_or_default();
            TopicWithLessons { topic, lessons }
        })
        .collect();

    Ok(Some(CourseModules { course, topics }))
}
