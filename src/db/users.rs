//! 사용자와 리프레시 토큰 쿼리.
//!
//! 사용자 조회는 `UserLookup`으로 키(ID, 사용자명, 이메일)를 골라 한 함수로 처리합니다.
//! 새 사용자의 역할은 스키마 기본값(`student`)이고, 관리자 승격은 `set_role`로만 합니다.

use crate::error::AppError;
use crate::models::user::{Role, User};
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at";

#[derive(Debug, Clone, Copy)]
pub enum UserLookup<'a> {
    Id(i64),
    Username(&'a str),
    Email(&'a str),
}

/// 저장된 리프레시 토큰 (해시로 찾은 행)
#[derive(Debug, sqlx::FromRow)]
pub struct StoredRefreshToken {
    pub user_id: i64,
    pub expires_at: String,
}

pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
) -> Result<User, AppError> {
    let sql = format!(
        "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?) RETURNING {}",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;

    Ok(user)
}

pub async fn find_user(pool: &SqlitePool, lookup: UserLookup<'_>) -> Result<Option<User>, AppError> {
    let column = match lookup {
        UserLookup::Id(_) => "id",
        UserLookup::Username(_) => "username",
        UserLookup::Email(_) => "email",
    };
    let sql = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, column);
    let query = sqlx::query_as::<_, User>(&sql);
    let query = match lookup {
        UserLookup::Id(id) => query.bind(id),
        UserLookup::Username(name) => query.bind(name),
        UserLookup::Email(email) => query.bind(email),
    };

    Ok(query.fetch_optional(pool).await?)
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, AppError> {
    let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
    let users = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;

    Ok(users)
}

/// 역할을 바꾸고 바뀐 사용자를 반환합니다. 없는 사용자면 `None`.
pub async fn set_role(pool: &SqlitePool, user_id: i64, role: Role) -> Result<Option<User>, AppError> {
    let sql = format!(
        "UPDATE users SET role = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
         WHERE id = ? RETURNING {}",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(role)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn store_refresh_token(
    pool: &SqlitePool,
    user_id: i64,
    token_hash: &str,
    expires_at: &str,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at) VALUES (?, ?, ?, ?)")
        .bind(uuid::Uuid::now_v7().to_string())
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(())
}

/// 해시로 토큰을 찾으면서 동시에 삭제합니다 (rotation에서 한 번만 쓰이도록).
pub async fn take_refresh_token(
    pool: &SqlitePool,
    token_hash: &str,
) -> Result<Option<StoredRefreshToken>, AppError> {
    let token = sqlx::query_as::<_, StoredRefreshToken>(
        "DELETE FROM refresh_tokens WHERE token_hash = ? RETURNING user_id, expires_at",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(token)
}

/// 로그아웃: 사용자의 모든 리프레시 토큰 폐기
pub async fn revoke_refresh_tokens(pool: &SqlitePool, user_id: i64) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
