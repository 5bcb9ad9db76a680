//! # 설정(Setting) 모델
//!
//! 이름으로 식별되는 전역 설정값입니다. 값은 JSON으로 저장됩니다.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Setting {
    pub id: i64,
    pub name: String,
    pub value: Json<serde_json::Value>,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSettingRequest {
    pub name: String,
    pub value: serde_json::Value,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingPatch {
    pub value: Option<serde_json::Value>,
    pub description: Option<String>,
}
