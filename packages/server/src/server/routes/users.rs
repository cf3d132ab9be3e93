//! Profile and account management.

use axum::{extract::Extension, Json};
use serde::Deserialize;

use crate::domains::auth::hash_password;
use crate::domains::users::{UpdateUser, User, UserPublic};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::{require_admin, require_user, AuthUser};

#[derive(Debug, Deserialize, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// GET /api/user/profile
pub async fn profile_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<UserPublic>, ApiError> {
    let auth = require_user(auth.as_deref())?;

    let user = User::find_by_id_optional(auth.user_id, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("user"))?;

    Ok(Json(user.into()))
}

/// PUT /api/user
pub async fn update_profile_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserPublic>, ApiError> {
    let auth = require_user(auth.as_deref())?;

    if let Some(email) = &body.email {
        if email.trim().is_empty() || !email.contains('@') {
            return Err(ApiError::bad_request("A valid email is required"));
        }
    }
    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Name must not be empty"));
        }
    }
    if let Some(password) = &body.password {
        if password.chars().count() < 8 {
            return Err(ApiError::bad_request(
                "Password must be at least 8 characters",
            ));
        }
    }

    let password_hash = match &body.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let input = UpdateUser {
        name: body.name.map(|n| n.trim().to_string()),
        email: body.email.map(|e| e.trim().to_lowercase()),
        phone: body.phone,
        password_hash,
    };

    let user = match User::update(auth.user_id, input, &state.db_pool).await {
        Ok(user) => user,
        Err(err) => {
            if let Some(sqlx::Error::Database(db_err)) = err.downcast_ref::<sqlx::Error>() {
                if db_err.is_unique_violation() {
                    return Err(ApiError::conflict("Email is already registered"));
                }
            }
            return Err(err.into());
        }
    };

    Ok(Json(user.into()))
}

/// GET /api/admin/users
pub async fn list_users_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Vec<UserPublic>>, ApiError> {
    require_admin(auth.as_deref())?;

    let users = User::find_all(&state.db_pool).await?;
    Ok(Json(users.into_iter().map(UserPublic::from).collect()))
}
