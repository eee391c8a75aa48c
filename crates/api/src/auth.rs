use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use entity::{user, user_secret};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
}

/// The authenticated actor behind a request. Its id feeds the
/// `recorded_by` audit columns on the ledgers.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: Uuid,
}

pub fn issue_token(user_id: Uuid, config: &AuthConfig) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::minutes(config.session_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = SessionClaims {
        sub: user_id,
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(
    token: &str,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}

#[derive(Debug, Clone)]
pub struct LoginSession {
    pub token: String,
    pub user: user::Model,
}

/// Verify an email/password pair and issue a bearer token. All failure
/// paths report the same message so the endpoint does not leak which
/// accounts exist.
pub async fn login(
    db: &DatabaseConnection,
    config: &AuthConfig,
    email: &str,
    password: &str,
) -> ApiResult<LoginSession> {
    let normalized = email.trim().to_lowercase();
    let Some(record) = user::Entity::find()
        .filter(user::Column::Email.eq(normalized))
        .one(db)
        .await?
    else {
        return Err(ApiError::unauthorized("Invalid credentials"));
    };
    if !record.is_active {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }
    let Some(secret) = user_secret::Entity::find_by_id(record.id).one(db).await? else {
        return Err(ApiError::unauthorized("Invalid credentials"));
    };
    let parsed = PasswordHash::new(&secret.password_hash)
        .map_err(|_| ApiError::unauthorized("Invalid credentials"))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_err()
    {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }
    let token = issue_token(record.id, config)
        .map_err(|err| ApiError::Db(sea_orm::DbErr::Custom(format!("token issue: {err}"))))?;
    Ok(LoginSession {
        token,
        user: record,
    })
}

pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ApiError::Db(sea_orm::DbErr::Custom(format!("hash error: {err}"))))
}
