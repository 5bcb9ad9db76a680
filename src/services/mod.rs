//! # 비즈니스 로직 모듈
//!
//! - `scoring`: 점수/진도 계산 규칙 (순수 함수)
//! - `practice`: 연습 문제 제출과 조회
//! - `progress`: 토픽/레슨 진도 집계와 평가 저장

pub mod practice;
pub mod progress;
pub mod scoring;
