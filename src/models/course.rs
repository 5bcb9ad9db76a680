//! # 콘텐츠 모델 정의
//!
//! Course → Topic → Lesson 3단계 계층 구조의 데이터 타입들입니다.
//! 각 Topic은 하나의 Course에, 각 Lesson은 하나의 Topic에 속하며,
//! `topic_index` / `lesson_index`가 학습 순서를 결정합니다.
//!
//! ## 구조체 역할
//! - `Course`, `Topic`, `Lesson`: DB 테이블 한 행에 대응 (응답용)
//! - `Create*Request`: 생성 요청 본문
//! - `*Patch`: 부분 수정 요청 본문 (모든 필드가 Option)
//! - `LessonExample`: 레슨 예문 JSON 컬럼의 원소

use super::json::JsonField;
use crate::error::FieldError;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// 난이도. DB에는 소문자 TEXT로 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Default for Level {
    fn default() -> Self {
        Level::Beginner
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub level: Level,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Topic {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub level: Level,
    pub topic_index: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// 레슨 예문: `lessons.examples` JSON 배열의 원소
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonExample {
    pub sentence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lesson {
    pub id: i64,
    pub topic_id: i64,
    pub title: String,
    pub content: String,
    pub lesson_index: i64,
    pub examples: Json<Vec<LessonExample>>,
    pub keywords: Json<Vec<String>>,
    pub tags: Json<Vec<String>>,
    pub skills_covered: Json<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub level: Option<Level>,
    pub is_published: Option<bool>,
}

impl CoursePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.level.is_none()
            && self.is_published.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTopicRequest {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub level: Level,
    pub topic_index: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub level: Option<Level>,
    pub topic_index: Option<i64>,
}

impl TopicPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.level.is_none()
            && self.topic_index.is_none()
    }
}

/// 레슨 생성 요청
///
/// JSON 필드(examples, keywords, tags, skills_covered)는
/// 배열 그대로 보내거나 JSON 문자열로 인코딩해서 보낼 수 있습니다.
#[derive(Debug, Deserialize)]
pub struct CreateLessonRequest {
    pub topic_id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub lesson_index: Option<i64>,
    pub examples: Option<JsonField<Vec<LessonExample>>>,
    pub keywords: Option<JsonField<Vec<String>>>,
    pub tags: Option<JsonField<Vec<String>>>,
    pub skills_covered: Option<JsonField<Vec<String>>>,
}

/// JSON 필드를 모두 해석한 레슨 데이터 (INSERT에 그대로 사용)
#[derive(Debug, Clone, Default)]
pub struct LessonFields {
    pub examples: Vec<LessonExample>,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
    pub skills_covered: Vec<String>,
}

impl CreateLessonRequest {
    /// 인코딩된 JSON 필드를 해석합니다. 실패한 필드를 모두 모아 반환합니다.
    pub fn resolve_fields(&mut self) -> Result<LessonFields, Vec<FieldError>> {
        let mut errors = Vec::new();
        let fields = LessonFields {
            examples: resolve_or_default(self.examples.take(), "examples", &mut errors),
            keywords: resolve_or_default(self.keywords.take(), "keywords", &mut errors),
            tags: resolve_or_default(self.tags.take(), "tags", &mut errors),
            skills_covered: resolve_or_default(
                self.skills_covered.take(),
                "skills_covered",
                &mut errors,
            ),
        };
        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LessonPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub lesson_index: Option<i64>,
    pub examples: Option<JsonField<Vec<LessonExample>>>,
    pub keywords: Option<JsonField<Vec<String>>>,
    pub tags: Option<JsonField<Vec<String>>>,
    pub skills_covered: Option<JsonField<Vec<String>>>,
}

/// JSON 필드를 해석한 레슨 패치
#[derive(Debug, Default)]
pub struct ResolvedLessonPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub lesson_index: Option<i64>,
    pub examples: Option<Vec<LessonExample>>,
    pub keywords: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub skills_covered: Option<Vec<String>>,
}

impl ResolvedLessonPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.lesson_index.is_none()
            && self.examples.is_none()
            && self.keywords.is_none()
            && self.tags.is_none()
            && self.skills_covered.is_none()
    }
}

impl LessonPatch {
    pub fn resolve(self) -> Result<ResolvedLessonPatch, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut resolve = |value: Option<JsonField<Vec<String>>>, field: &str| {
            value.and_then(|v| v.resolve(field).map_err(|e| errors.push(e)).ok())
        };
        let keywords = resolve(self.keywords, "keywords");
        let tags = resolve(self.tags, "tags");
        let skills_covered = resolve(self.skills_covered, "skills_covered");
        let examples = self
            .examples
            .and_then(|v| v.resolve("examples").map_err(|e| errors.push(e)).ok());

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ResolvedLessonPatch {
            title: self.title,
            content: self.content,
            lesson_index: self.lesson_index,
            examples,
            keywords,
            tags,
            skills_covered,
        })
    }
}

fn resolve_or_default<T>(
    value: Option<JsonField<T>>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> T
where
    T: Default + serde::de::DeserializeOwned,
{
    match value.map(|v| v.resolve(field)) {
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            errors.push(e);
            T::default()
        }
        None => T::default(),
    }
}

/// 토픽과 그 레슨 목록 (코스 모듈 트리 응답용)
#[derive(Debug, Serialize)]
pub struct TopicWithLessons {
    #[serde(flatten)]
    pub topic: Topic,
    pub lessons: Vec<Lesson>,
}

/// `GET /course-modules/{course_id}` 응답
#[derive(Debug, Serialize)]
pub struct CourseModules {
    #[serde(flatten)]
    pub course: Course,
    pub topics: Vec<TopicWithLessons>,
}
