//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체들을 정의합니다.
//! - `course`: 코스/토픽/레슨 콘텐츠
//! - `practice`: 연습 문제 시도와 채점 결과
//! - `progress`: 학습 진도
//! - `assessment`: 레슨 평가 기록
//! - `setting`: 전역 설정
//! - `upload`: 코스 콘텐츠 일괄 교체
//! - `user`: 사용자와 인증
//! - `json`: JSON 컬럼 입력 처리

pub mod assessment;
pub mod course;
pub mod json;
pub mod practice;
pub mod progress;
pub mod setting;
pub mod upload;
pub mod user;

pub use assessment::*;
pub use course::*;
pub use json::*;
pub use practice::*;
pub use progress::*;
pub use setting::*;
pub use upload::*;
pub use user::*;
