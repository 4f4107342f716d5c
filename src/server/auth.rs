//! Password hashing, access tokens, and the authenticated-user extractor.

use anyhow::anyhow;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::database::entities::{users, users::Entity as Users};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string.
    pub sub: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    if password.is_empty() {
        return Err(ApiError::Validation("Password cannot be empty".to_string()));
    }
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(anyhow!("failed to hash password: {e}")))
}

/// Returns false for a wrong password and for a malformed stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn create_access_token(
    user_id: i32,
    secret: &str,
    expiry_minutes: i64,
) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::minutes(expiry_minutes)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(anyhow!("failed to sign token: {e}")))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| credentials_error())
}

fn credentials_error() -> ApiError {
    ApiError::Unauthorized("Could not validate credentials".to_string())
}

/// Extracts the caller from the `Authorization: Bearer <token>` header and
/// resolves it to a user row. The token subject is normally a user id;
/// an email subject is accepted as a fallback for externally minted tokens.
pub struct AuthUser(pub users::Model);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(credentials_error)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(credentials_error)?;

        let claims = decode_token(token, &state.config.jwt_secret)?;

        let user = match claims.sub.parse::<i32>() {
            Ok(id) => Users::find_by_id(id).one(&state.db).await?,
            Err(_) => {
                Users::find()
                    .filter(users::Column::Email.eq(claims.sub.as_str()))
                    .one(&state.db)
                    .await?
            }
        };

        user.map(AuthUser).ok_or_else(credentials_error)
    }
}
