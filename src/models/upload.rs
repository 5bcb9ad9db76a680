//! # 코스 콘텐츠 일괄 교체(Bulk Replace) 모델
//!
//! 관리자가 코스의 토픽/레슨 전체를 한 번에 교체할 때 쓰는 요청 본문과,
//! 교체 이력(`admin_content_uploads`) 행을 정의합니다.

use super::{CoursePatch, LessonExample};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// 일괄 교체 요청
///
/// `level`은 문자열 그대로 받아 DB의 CHECK 제약에 검증을 맡깁니다.
/// 잘못된 값이 있으면 트랜잭션 전체가 롤백됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<CourseFields>,
    pub topics: Vec<TopicPayload>,
}

/// 일괄 교체 시 함께 갱신할 코스 필드
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseFields {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl From<&CourseFields> for CoursePatch {
    fn from(fields: &CourseFields) -> Self {
        CoursePatch {
            title: fields.title.clone(),
            description: fields.description.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub lessons: Vec<LessonPayload>,
}

fn default_level() -> String {
    "beginner".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonPayload {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub examples: Vec<LessonExample>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub skills_covered: Vec<String>,
}

impl ContentPayload {
    pub fn lesson_count(&self) -> usize {
        self.topics.iter().map(|t| t.lessons.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContentUpload {
    pub id: i64,
    pub course_id: i64,
    pub uploaded_by: i64,
    pub topic_count: i64,
    pub lesson_count: i64,
    pub payload: Json<ContentPayload>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ReplaceContentResponse {
    pub upload_id: i64,
    pub topic_count: i64,
    pub lesson_count: i64,
}
