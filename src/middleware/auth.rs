//! # JWT 인증
//!
//! 액세스 토큰과 리프레시 토큰은 같은 비밀키로 서명하고 `typ` 클레임으로 구분합니다.
//! 두 토큰 모두 사용자 역할(`role`)을 담으므로, 핸들러는 DB 조회 없이
//! `AuthUser`만으로 "본인 또는 관리자" 여부를 판단할 수 있습니다.
//!
//! 역할이 바뀌면 다음 로그인/리프레시부터 토큰에 반영됩니다.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::models::user::{Role, User};
use crate::routes::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn lifetime(self) -> Duration {
        match self {
            TokenKind::Access => Duration::minutes(15),
            TokenKind::Refresh => Duration::days(7),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// 사용자 ID (문자열)
    pub sub: String,
    pub role: Role,
    pub typ: TokenKind,
    pub exp: i64,
    pub iat: i64,
    /// 같은 초에 발급된 토큰끼리도 해시가 겹치지 않게 하는 고유 ID
    pub jti: String,
}

impl Claims {
    fn user_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// 인증된 요청의 사용자. 핸들러 인자로 두면 토큰이 없는 요청은 401로 거부됩니다.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// 다른 사용자의 학습 기록은 관리자만 읽고 쓸 수 있습니다.
    pub fn ensure_can_access(&self, user_id: i64) -> Result<(), AppError> {
        if self.user_id == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Cannot access learning records of user {}",
                user_id
            )))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = verify_token(token, TokenKind::Access, &state.jwt_secret)?;
        Ok(AuthUser {
            user_id: claims.user_id()?,
            role: claims.role,
        })
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl AuthError {
    fn code_and_message(&self) -> (&'static str, &'static str) {
        match self {
            AuthError::MissingToken => ("missing_token", "Authorization token is required"),
            AuthError::InvalidToken => ("invalid_token", "Invalid authorization token"),
            AuthError::ExpiredToken => ("expired_token", "Authorization token has expired"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, message) = self.code_and_message();
        let body = json!({ "ok": false, "code": code, "message": message });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// 사용자 ID와 역할을 담은 토큰을 서명합니다.
pub fn issue_token(
    user: &User,
    kind: TokenKind,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role,
        typ: kind,
        iat: now.timestamp(),
        exp: (now + kind.lifetime()).timestamp(),
        jti: uuid::Uuid::now_v7().to_string(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// 서명과 만료를 검증하고, 기대한 종류의 토큰인지 확인합니다.
pub fn verify_token(token: &str, expected: TokenKind, secret: &str) -> Result<Claims, AuthError> {
    let claims = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?
    .claims;

    if claims.typ != expected {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}

/// 리프레시 토큰은 원문 대신 SHA-256 해시(hex)로 저장합니다.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
