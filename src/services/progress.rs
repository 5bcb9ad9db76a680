//! # 진도 집계 서비스
//!
//! - `recompute_from_attempts`: 연습 문제 제출 후 토픽 단위 진도 재계산
//! - `save_assessment`: 레슨 평가 저장과 레슨 단위 진도 갱신
//! - `topic_lesson_summary`: 레슨 평가 기반 토픽 요약
//!
//! 진도는 매번 처음부터 다시 계산합니다. 저장된 값은 항상 마지막 계산 결과입니다.

use super::scoring;
use crate::{db, error::AppError, models::*};
use sqlx::SqlitePool;
use std::collections::HashSet;

/// 토픽의 모든 시도로 토픽 단위 진도 행을 다시 씁니다.
pub async fn recompute_from_attempts(
    pool: &SqlitePool,
    user_id: i64,
    topic: &Topic,
    practices_per_topic: u32,
) -> Result<StudentProgress, AppError> {
    let scores = db::attempt_scores(pool, user_id, topic.id).await?;
    let summary = scoring::summarize_scores(&scores);
    let (progress_percentage, status) = scoring::attempt_progress(
        summary.total_practices,
        summary.average_score,
        practices_per_topic,
    );

    let row = db::upsert_progress(
        pool,
        &ProgressWrite {
            user_id,
            course_id: topic.course_id,
            topic_id: topic.id,
            lesson_id: None,
            status,
            progress_percentage,
        },
    )
    .await?;

    tracing::debug!(
        user_id,
        topic_id = topic.id,
        progress_percentage,
        status = ?status,
        "topic progress recomputed"
    );
    Ok(row)
}

/// 명시적인 상태 변경 (`PUT /progress/student/{user_id}/topic/{topic_id}`)
///
/// 진도 값이 없으면 상태에서 유도합니다: not_started → 0, completed → 100,
/// in_progress → 기존 값 유지.
pub async fn set_topic_status(
    pool: &SqlitePool,
    user_id: i64,
    topic_id: i64,
    req: &UpdateTopicProgressRequest,
) -> Result<StudentProgress, AppError> {
    if let Some(p) = req.progress_percentage {
        if !(0.0..=100.0).contains(&p) {
            return Err(AppError::invalid(
                "progress_percentage",
                "progress_percentage must be between 0 and 100",
            ));
        }
    }

    let topic = db::get_topic(pool, topic_id)
        .await?
        .ok_or_else(|| AppError::not_found("Topic"))?;

    let progress_percentage = match (req.progress_percentage, req.status) {
        (Some(p), _) => p,
        (None, ProgressStatus::NotStarted) => 0.0,
        (None, ProgressStatus::Completed) => 100.0,
        (None, ProgressStatus::InProgress) => db::find_progress(pool, user_id, topic_id, None)
            .await?
            .map(|row| row.progress_percentage)
            .unwrap_or(0.0),
    };

    db::upsert_progress(
        pool,
        &ProgressWrite {
            user_id,
            course_id: topic.course_id,
            topic_id,
            lesson_id: None,
            status: req.status,
            progress_percentage,
        },
    )
    .await
}

/// 레슨 평가 하나를 저장합니다.
///
/// 두 쓰기는 하나의 트랜잭션입니다.
/// 1. 레슨 진도 행 upsert (평가 행이 참조할 ID 확보)
/// 2. 정확도 × 레슨 배분 점수로 기여 점수를 계산해 평가 upsert
/// 3. 평가 테이블에 실제로 저장된 유형들로 레슨 진도를 다시 계산해 행 갱신
///
/// 동시에 다른 유형을 저장해도 마지막 커밋이 모든 유형을 보게 됩니다.
pub async fn save_assessment(
    pool: &SqlitePool,
    req: &SaveAssessmentRequest,
) -> Result<SaveAssessmentResponse, AppError> {
    let lesson = db::get_lesson(pool, req.lesson_id)
        .await?
        .ok_or_else(|| AppError::not_found("Lesson"))?;
    let topic = db::get_topic(pool, lesson.topic_id)
        .await?
        .ok_or_else(|| AppError::not_found("Topic"))?;
    let total_lessons = db::count_lessons(pool, topic.id).await?;

    let total = req.practice_answered.len();
    let correct = req.practice_answered.iter().filter(|a| a.is_correct).count();
    let contribution = scoring::lesson_contribution(correct, total, total_lessons);
    let feedback = req
        .feedback
        .clone()
        .unwrap_or_else(|| format!("{} of {} correct", correct, total));

    let lesson_write = |types: &HashSet<AssessmentType>| {
        let (progress_percentage, status) = scoring::lesson_progress(types);
        ProgressWrite {
            user_id: req.user_id,
            course_id: topic.course_id,
            topic_id: topic.id,
            lesson_id: Some(lesson.id),
            status,
            progress_percentage,
        }
    };

    let mut tx = pool.begin().await?;

    let provisional = db::upsert_progress(
        &mut *tx,
        &lesson_write(&HashSet::from([req.assessment_type])),
    )
    .await?;

    let assessment = db::upsert_assessment(
        &mut *tx,
        provisional.id,
        req.user_id,
        req.assessment_type,
        &req.practice_answered,
        contribution,
        &feedback,
    )
    .await?;

    let types: HashSet<AssessmentType> = db::completed_types(&mut *tx, provisional.id)
        .await?
        .into_iter()
        .collect();
    let row = db::upsert_progress(&mut *tx, &lesson_write(&types)).await?;

    tx.commit().await?;

    tracing::info!(
        user_id = req.user_id,
        lesson_id = lesson.id,
        assessment_type = ?req.assessment_type,
        contribution,
        lesson_status = ?row.status,
        "lesson assessment saved"
    );

    let mut completed_types: Vec<_> = types.into_iter().collect();
    completed_types.sort_by_key(|ty| AssessmentType::ALL.iter().position(|t| t == ty));

    Ok(SaveAssessmentResponse {
        student_progress_id: row.id,
        assessment,
        lesson_status: row.status,
        lesson_progress_percentage: row.progress_percentage,
        completed_types,
    })
}

pub async fn lesson_progress_view(
    pool: &SqlitePool,
    user_id: i64,
    lesson_id: i64,
) -> Result<LessonProgressView, AppError> {
    let lesson = db::get_lesson(pool, lesson_id)
        .await?
        .ok_or_else(|| AppError::not_found("Lesson"))?;

    let view = match db::find_progress(pool, user_id, lesson.topic_id, Some(lesson.id)).await? {
        Some(row) => LessonProgressView {
            user_id,
            lesson_id,
            status: row.status,
            progress_percentage: row.progress_percentage,
            assessments: db::list_assessments(pool, row.id).await?,
        },
        None => LessonProgressView {
            user_id,
            lesson_id,
            status: ProgressStatus::NotStarted,
            progress_percentage: 0.0,
            assessments: Vec::new(),
        },
    };
    Ok(view)
}

pub async fn topic_lesson_summary(
    pool: &SqlitePool,
    user_id: i64,
    topic_id: i64,
) -> Result<TopicLessonSummary, AppError> {
    if db::get_topic(pool, topic_id).await?.is_none() {
        return Err(AppError::not_found("Topic"));
    }
    let total_lessons = db::count_lessons(pool, topic_id).await?;
    let rows = db::topic_assessment_rows(pool, user_id, topic_id).await?;
    Ok(scoring::summarize_topic_lessons(topic_id, total_lessons, &rows))
}
