use axum::extract::State;
use axum::response::Json;
use axum::Form;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::entities::{users, users::Entity as Users};
use crate::server::app::AppState;
use crate::server::auth::{create_access_token, hash_password, verify_password};
use crate::server::error::ApiError;

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "member".to_string()
}

#[derive(Serialize, ToSchema)]
pub struct UserOut {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<users::Model> for UserOut {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Login uses form fields named `username`/`password`; the username carries
/// the email, matching the OAuth2 password flow the original clients speak.
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created", body = UserOut),
        (status = 400, description = "Email already exists or invalid input")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserOut>, ApiError> {
    if !matches!(payload.role.as_str(), "admin" | "pm" | "member") {
        return Err(ApiError::Validation(format!(
            "Invalid role: {}",
            payload.role
        )));
    }
    if !payload.email.contains('@') {
        return Err(ApiError::Validation("Invalid email".to_string()));
    }

    let exists = Users::find()
        .filter(users::Column::Email.eq(payload.email.as_str()))
        .one(&state.db)
        .await?;
    if exists.is_some() {
        return Err(ApiError::Validation("Email already exists".to_string()));
    }

    let user = users::ActiveModel {
        name: Set(payload.name),
        email: Set(payload.email),
        password_hash: Set(hash_password(&payload.password)?),
        role: Set(payload.role),
        department_id: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let user = user.insert(&state.db).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    responses(
        (status = 200, description = "Access token issued", body = Token),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginRequest>,
) -> Result<Json<Token>, ApiError> {
    let user = Users::find()
        .filter(users::Column::Email.eq(form.username.as_str()))
        .one(&state.db)
        .await?;

    let user = match user {
        Some(user) if verify_password(&form.password, &user.password_hash) => user,
        _ => return Err(ApiError::Unauthorized("Invalid credentials".to_string())),
    };

    let access_token = create_access_token(
        user.id,
        &state.config.jwt_secret,
        state.config.token_expiry_minutes,
    )?;

    Ok(Json(Token {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
