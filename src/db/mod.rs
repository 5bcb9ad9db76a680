//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)와 서비스(services/)에서 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `content`: 코스/토픽/레슨 CRUD와 코스 모듈 트리
//! - `bulk`: 코스 콘텐츠 일괄 교체 트랜잭션과 교체 이력
//! - `practice`: 연습 문제 시도 기록
//! - `progress`: 학습 진도 upsert와 집계 조회
//! - `assessments`: 레슨 평가 upsert
//! - `settings`: 전역 설정 CRUD
//! - `users`: 사용자 인증 관련 쿼리

pub mod assessments;
pub mod bulk;
pub mod content;
pub mod practice;
pub mod progress;
pub mod settings;
pub mod users;

pub use assessments::*;
pub use bulk::*;
pub use content::*;
pub use practice::*;
pub use progress::*;
pub use settings::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// 모든 SQL에서 쓰는 현재 시각 표현식 (ISO 8601, UTC)
pub const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// SQLite 연결 풀을 만들고 마이그레이션을 실행합니다.
///
/// 데이터베이스 파일이 없으면 새로 생성합니다.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
