use super::{ok, ok_with, ApiResult, AppState};
use crate::{
    db::users::{self as db_users, UserLookup},
    error::AppError,
    extract::ApiJson,
    middleware::auth::{hash_token, issue_token, verify_token, AuthUser, TokenKind},
    models::user::*,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::extract::State;
use chrono::{Duration, Utc};
use serde_json::Value;

const REFRESH_TOKEN_DAYS: i64 = 7;
const EXPIRES_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// 액세스/리프레시 토큰을 새로 발급하고 리프레시 토큰 해시를 저장합니다.
///
/// 토큰에는 발급 시점의 역할이 들어갑니다.
async fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let sign = |kind| {
        issue_token(&user, kind, &state.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    };
    let access_token = sign(TokenKind::Access)?;
    let refresh_token = sign(TokenKind::Refresh)?;

    let expires_at = (Utc::now() + Duration::days(REFRESH_TOKEN_DAYS))
        .format(EXPIRES_AT_FORMAT)
        .to_string();
    db_users::store_refresh_token(&state.pool, user.id, &hash_token(&refresh_token), &expires_at)
        .await?;

    Ok(AuthResponse {
        user: user.into(),
        access_token,
        refresh_token,
    })
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    if req.username.len() < 3 {
        return Err(AppError::invalid("username", "Username must be at least 3 characters"));
    }
    if req.password.len() < 8 {
        return Err(AppError::invalid("password", "Password must be at least 8 characters"));
    }
    if let Some(email) = req.email.as_deref() {
        if !email.contains('@') {
            return Err(AppError::invalid("email", "Invalid email address"));
        }
        if db_users::find_user(&state.pool, UserLookup::Email(email)).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
    }

    if db_users::find_user(&state.pool, UserLookup::Username(&req.username)).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    // Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    let user =
        db_users::create_user(&state.pool, &req.username, req.email.as_deref(), &password_hash)
            .await?;
    tracing::info!(user_id = user.id, username = %user.username, "user registered");

    ok(issue_tokens(&state, user).await?)
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let user = db_users::find_user(&state.pool, UserLookup::Username(&req.username))
        .await?
        .ok_or(AppError::Unauthorized("Invalid username or password".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid username or password".to_string()))?;

    ok(issue_tokens(&state, user).await?)
}

pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<AuthResponse> {
    verify_token(&req.refresh_token, TokenKind::Refresh, &state.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    // 회전(rotation): 찾는 순간 폐기되므로 같은 토큰은 두 번 쓸 수 없음
    let stored = db_users::take_refresh_token(&state.pool, &hash_token(&req.refresh_token))
        .await?
        .ok_or(AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    let expires = chrono::NaiveDateTime::parse_from_str(&stored.expires_at, EXPIRES_AT_FORMAT)
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires.and_utc() < Utc::now() {
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let user = db_users::find_user(&state.pool, UserLookup::Id(stored.user_id))
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    ok(issue_tokens(&state, user).await?)
}

pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<Value> {
    let revoked = db_users::revoke_refresh_tokens(&state.pool, auth_user.user_id).await?;
    tracing::debug!(user_id = auth_user.user_id, revoked, "refresh tokens revoked");

    ok_with(Value::Null, "Logged out successfully")
}

pub async fn me(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<UserResponse> {
    let user = db_users::find_user(&state.pool, UserLookup::Id(auth_user.user_id))
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    ok(UserResponse::from(user))
}
