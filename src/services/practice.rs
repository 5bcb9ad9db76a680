//! # 연습 문제 채점 서비스
//!
//! 제출 → 중복 확인 → 점수 계산 → 저장 → 토픽 진도 재계산 순서로 처리합니다.
//!
//! (user, topic, practice_type, section_index)당 시도는 한 번만 허용됩니다.
//! 사전 확인에 더해 DB의 UNIQUE 제약이 동시 제출을 막고,
//! 제약 위반은 사전 확인과 같은 "already completed" 에러로 바꿉니다.

use super::{progress, scoring};
use crate::{
    db,
    error::{is_unique_violation, AppError},
    models::*,
};
use sqlx::SqlitePool;

/// 연습 문제 시도 하나를 기록하고 점수를 반환합니다.
///
/// 토픽 진도 재계산은 best-effort입니다. 실패해도 로그만 남기고
/// 이미 저장된 시도 결과를 그대로 반환합니다.
pub async fn submit(
    pool: &SqlitePool,
    practices_per_topic: u32,
    req: &SubmitPracticeRequest,
) -> Result<PracticeResult, AppError> {
    if req.correct_answers > req.total_questions {
        return Err(AppError::invalid(
            "correct_answers",
            "correct_answers cannot exceed total_questions",
        ));
    }

    let topic = db::get_topic(pool, req.topic_id)
        .await?
        .ok_or_else(|| AppError::not_found("Topic"))?;

    let section_index = i64::from(req.section_index);
    if !can_attempt(pool, req.user_id, req.topic_id, req.practice_type, section_index).await? {
        return Err(AppError::AlreadyCompleted);
    }

    // 합격 여부는 반올림 전 점수로 판정 (69.996은 70.0으로 저장되지만 불합격)
    let raw_score = scoring::practice_score(req.correct_answers, req.total_questions);
    let passed = scoring::is_passed(raw_score);
    let score = scoring::round2(raw_score);

    let attempt = db::NewAttempt {
        user_id: req.user_id,
        topic_id: req.topic_id,
        practice_type: req.practice_type,
        section_index,
        total_questions: i64::from(req.total_questions),
        correct_answers: i64::from(req.correct_answers),
        score,
        time_spent: i64::from(req.time_spent),
        answers: &req.answers,
    };

    let attempt_id = match db::insert_attempt(pool, &attempt).await {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => return Err(AppError::AlreadyCompleted),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        user_id = req.user_id,
        topic_id = req.topic_id,
        practice_type = ?req.practice_type,
        section_index,
        score,
        "practice attempt recorded"
    );

    if let Err(e) =
        progress::recompute_from_attempts(pool, req.user_id, &topic, practices_per_topic).await
    {
        tracing::warn!(
            user_id = req.user_id,
            topic_id = req.topic_id,
            error = %e,
            "failed to update topic progress after practice submission"
        );
    }

    Ok(PracticeResult {
        attempt_id,
        score,
        passed,
    })
}

/// 해당 조합의 시도가 아직 없으면 true
pub async fn can_attempt(
    pool: &SqlitePool,
    user_id: i64,
    topic_id: i64,
    practice_type: PracticeType,
    section_index: i64,
) -> Result<bool, AppError> {
    let existing =
        db::find_attempt_id(pool, user_id, topic_id, practice_type, section_index).await?;
    Ok(existing.is_none())
}

pub async fn topic_score(
    pool: &SqlitePool,
    user_id: i64,
    topic_id: i64,
) -> Result<TopicScore, AppError> {
    let scores = db::attempt_scores(pool, user_id, topic_id).await?;
    Ok(scoring::summarize_scores(&scores))
}
