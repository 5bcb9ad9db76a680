use super::NOW;
use crate::error::AppError;
use crate::models::*;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub async fn list_settings(pool: &SqlitePool) -> Result<Vec<Setting>, AppError> {
    let settings = sqlx::query_as::<_, Setting>(
        "SELECT id, name, value, description, created_at, updated_at FROM settings ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(settings)
}

pub async fn get_setting(pool: &SqlitePool, name: &str) -> Result<Option<Setting>, AppError> {
    let setting = sqlx::query_as::<_, Setting>(
        "SELECT id, name, value, description, created_at, updated_at FROM settings WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(setting)
}

/// 설정을 생성합니다. 이름이 중복되면 UNIQUE 위반 에러가 그대로 반환됩니다.
pub async fn create_setting(
    pool: &SqlitePool,
    name: &str,
    value: &serde_json::Value,
    description: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO settings (name, value, description) VALUES (?, ?, ?)")
        .bind(name)
        .bind(Json(value))
        .bind(description)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn update_setting(
    pool: &SqlitePool,
    name: &str,
    value: Option<&serde_json::Value>,
    description: Option<&str>,
) -> Result<Option<Setting>, AppError> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("UPDATE settings SET updated_at = {}", NOW));
    if let Some(value) = value {
        query.push(", value = ").push_bind(Json(value));
    }
    if let Some(description) = description {
        query.push(", description = ").push_bind(description);
    }
    query.push(" WHERE name = ").push_bind(name);

    if query.build().execute(pool).await?.rows_affected() == 0 {
        return Ok(None);
    }
    get_setting(pool, name).await
}

pub async fn delete_setting(pool: &SqlitePool, name: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM settings WHERE name = ?")
        .bind(name)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
