//! # 채점 및 진도 계산 규칙
//!
//! DB에 의존하지 않는 순수 함수들입니다. 두 가지 진도 계산 방식이 공존합니다.
//!
//! ## 시도 횟수 기반 (연습 문제 제출 직후)
//! 토픽당 연습 문제 수를 고정값(기본 15 = 듣기 5 + 말하기 5 + 빈칸 5)으로 두고
//! `min(완료한 시도 수 / 15 × 100, 100)`으로 계산합니다.
//! 100%에 도달해도 평균 점수가 70 미만이면 `in_progress`로 남습니다.
//!
//! ## 레슨 평가 기반 (레슨 뷰어)
//! 레슨 하나는 토픽 진도의 `100 / 전체 레슨 수`만큼을 차지하고,
//! 이를 4가지 평가 유형이 균등하게 나눕니다.
//! 한 유형의 기여 점수는 정확도(정답 수 / 문항 수)에 비례합니다.
//! 레슨은 4가지 유형이 모두 저장되어야 완료로 집계됩니다 (점수와 무관).

use crate::models::{
    AssessmentType, LessonAssessmentRow, ProgressStatus, TopicLessonSummary, TopicScore,
    TypeProgress,
};
use std::collections::{BTreeMap, HashSet};

/// 통과 기준 점수 (이상이면 통과)
pub const PASSING_SCORE: f64 = 70.0;

/// 레슨당 평가 유형 수
pub const ASSESSMENT_TYPES_PER_LESSON: usize = AssessmentType::ALL.len();

/// 유형별 토픽 진도 상한 (100 / 4)
pub const TYPE_PROGRESS_CAP: f64 = 100.0 / ASSESSMENT_TYPES_PER_LESSON as f64;

/// 소수점 둘째 자리에서 반올림합니다.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 시도 한 건의 점수. 문항이 없으면 0입니다.
pub fn practice_score(correct_answers: u32, total_questions: u32) -> f64 {
    if total_questions == 0 {
        return 0.0;
    }
    f64::from(correct_answers) * 100.0 / f64::from(total_questions)
}

pub fn is_passed(score: f64) -> bool {
    score >= PASSING_SCORE
}

/// 토픽의 모든 시도 점수를 요약합니다.
pub fn summarize_scores(scores: &[f64]) -> TopicScore {
    let total = scores.len() as i64;
    if total == 0 {
        return TopicScore {
            average_score: 0.0,
            total_practices: 0,
            passed_practices: 0,
            completion_rate: 0.0,
        };
    }

    let passed = scores.iter().filter(|s| is_passed(**s)).count() as i64;
    let average = scores.iter().sum::<f64>() / total as f64;

    TopicScore {
        average_score: round2(average),
        total_practices: total,
        passed_practices: passed,
        completion_rate: round2(passed as f64 * 100.0 / total as f64),
    }
}

/// 시도 횟수 기반 토픽 진도와 상태를 계산합니다.
pub fn attempt_progress(
    completed_attempts: i64,
    average_score: f64,
    practices_per_topic: u32,
) -> (f64, ProgressStatus) {
    if completed_attempts <= 0 {
        return (0.0, ProgressStatus::NotStarted);
    }

    let per_topic = f64::from(practices_per_topic.max(1));
    let progress = (completed_attempts as f64 * 100.0 / per_topic).min(100.0);

    let status = if progress >= 100.0 && is_passed(average_score) {
        ProgressStatus::Completed
    } else {
        ProgressStatus::InProgress
    };
    (round2(progress), status)
}

/// 평가 한 건이 토픽 진도에 기여하는 점수.
///
/// `(correct / total) × (100 / total_lessons) / 4`
pub fn lesson_contribution(correct: usize, total: usize, total_lessons: i64) -> f64 {
    if total == 0 || total_lessons <= 0 {
        return 0.0;
    }
    (correct as f64 * 100.0)
        / (total as f64 * total_lessons as f64 * ASSESSMENT_TYPES_PER_LESSON as f64)
}

/// 저장된 평가 유형으로 레슨 진도와 상태를 계산합니다.
pub fn lesson_progress(completed_types: &HashSet<AssessmentType>) -> (f64, ProgressStatus) {
    let done = completed_types.len().min(ASSESSMENT_TYPES_PER_LESSON);
    let progress = done as f64 * 100.0 / ASSESSMENT_TYPES_PER_LESSON as f64;
    let status = match done {
        0 => ProgressStatus::NotStarted,
        n if n == ASSESSMENT_TYPES_PER_LESSON => ProgressStatus::Completed,
        _ => ProgressStatus::InProgress,
    };
    (progress, status)
}

/// 토픽에 속한 레슨들의 평가 기록을 유형별/전체 진도로 집계합니다.
pub fn summarize_topic_lessons(
    topic_id: i64,
    total_lessons: i64,
    rows: &[LessonAssessmentRow],
) -> TopicLessonSummary {
    let mut by_lesson: BTreeMap<i64, HashSet<AssessmentType>> = BTreeMap::new();
    let mut earned = 0.0;
    for row in rows {
        by_lesson
            .entry(row.lesson_id)
            .or_default()
            .insert(row.assessment_type);
        earned += row.score;
    }

    let completed = by_lesson
        .values()
        .filter(|types| types.len() == ASSESSMENT_TYPES_PER_LESSON)
        .count() as i64;

    let type_progress = |ty: AssessmentType| {
        if total_lessons <= 0 {
            return 0.0;
        }
        let lessons = by_lesson.values().filter(|types| types.contains(&ty)).count();
        round2(lessons as f64 / total_lessons as f64 * TYPE_PROGRESS_CAP)
    };

    let overall = if total_lessons > 0 {
        round2(completed as f64 * 100.0 / total_lessons as f64)
    } else {
        0.0
    };

    TopicLessonSummary {
        topic_id,
        total_lessons,
        completed_lessons_count: completed,
        topic_progress: TypeProgress {
            reading: type_progress(AssessmentType::Reading),
            writing: type_progress(AssessmentType::Writing),
            listening: type_progress(AssessmentType::Listening),
            speaking: type_progress(AssessmentType::Speaking),
        },
        overall_percentage: overall,
        earned_points: round2(earned),
    }
}
