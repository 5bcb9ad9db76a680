//! # 사용자 조회와 역할 변경
//!
//! 목록과 역할 변경은 관리자 전용이고, 단건 조회는 본인 또는 관리자입니다.

use super::{ok, ok_with, ApiResult, AppState};
use crate::{
    db::users::{self as db_users, UserLookup},
    error::AppError,
    extract::{ApiJson, ApiPath},
    middleware::auth::AuthUser,
    models::user::{Role, UserResponse},
};
use axum::extract::State;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

fn require_admin(auth: &AuthUser) -> Result<(), AppError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin role required".to_string()))
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Vec<UserResponse>> {
    require_admin(&auth)?;
    let users = db_users::list_users(&state.pool).await?;
    ok(users.into_iter().map(UserResponse::from).collect())
}

pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<UserResponse> {
    auth.ensure_can_access(id)?;
    let user = db_users::find_user(&state.pool, UserLookup::Id(id))
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    ok(UserResponse::from(user))
}

/// `PUT /users/{id}/role`: 새 역할은 대상 사용자의 다음 토큰부터 적용됩니다.
pub async fn set_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<SetRoleRequest>,
) -> ApiResult<UserResponse> {
    require_admin(&auth)?;
    let user = db_users::set_role(&state.pool, id, req.role)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    tracing::info!(user_id = id, role = ?user.role, changed_by = auth.user_id, "user role changed");
    ok_with(UserResponse::from(user), "Role updated")
}
