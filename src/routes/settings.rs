//! # 설정(Setting) 라우트 핸들러
//!
//! 설정은 이름(`name`)으로 식별합니다. 같은 이름으로 다시 만들면 409입니다.
//! 값은 임의의 JSON이며, 문자열로 보내면 JSON 텍스트로 파싱해 검증합니다.

use super::{ok, ok_with, ApiResult, AppState};
use crate::{
    db,
    error::{is_unique_violation, AppError},
    extract::{ApiJson, ApiPath},
    middleware::auth::AuthUser,
    models::*,
};
use axum::extract::State;
use serde_json::{json, Value};

pub async fn list_settings(State(state): State<AppState>) -> ApiResult<Vec<Setting>> {
    ok(db::list_settings(&state.pool).await?)
}

pub async fn get_setting(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Setting> {
    let setting = db::get_setting(&state.pool, &name)
        .await?
        .ok_or_else(|| AppError::not_found("Setting"))?;
    ok(setting)
}

pub async fn create_setting(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(req): ApiJson<CreateSettingRequest>,
) -> ApiResult<Setting> {
    if req.name.trim().is_empty() {
        return Err(AppError::invalid("name", "name is required"));
    }
    let value = parse_json_value(req.value, "value").map_err(|e| AppError::Validation(vec![e]))?;

    match db::create_setting(&state.pool, &req.name, &value, req.description.as_deref()).await {
        Ok(()) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::Conflict(format!(
                "Setting '{}' already exists",
                req.name
            )))
        }
        Err(e) => return Err(e.into()),
    }

    let setting = db::get_setting(&state.pool, &req.name)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created setting".to_string()))?;
    ok_with(setting, "Setting created")
}

pub async fn update_setting(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(name): ApiPath<String>,
    ApiJson(patch): ApiJson<SettingPatch>,
) -> ApiResult<Setting> {
    if patch.value.is_none() && patch.description.is_none() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }
    let value = patch
        .value
        .map(|v| parse_json_value(v, "value"))
        .transpose()
        .map_err(|e| AppError::Validation(vec![e]))?;

    let setting = db::update_setting(
        &state.pool,
        &name,
        value.as_ref(),
        patch.description.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::not_found("Setting"))?;
    ok_with(setting, "Setting updated")
}

pub async fn delete_setting(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Value> {
    if !db::delete_setting(&state.pool, &name).await? {
        return Err(AppError::not_found("Setting"));
    }
    ok_with(json!({ "name": name }), "Setting deleted")
}
