//! Registration and login.

use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::domains::auth::{hash_password, verify_password};
use crate::domains::users::{CreateUser, User, UserPublic, UserRole};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

/// POST /api/auth/register
pub async fn register_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    register(state, body, UserRole::User).await
}

/// POST /api/admin/register-admin
///
/// Bootstrap path for creating administrator accounts. Deployments that
/// have seeded their admins should disable or firewall this route.
pub async fn register_admin_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    register(state, body, UserRole::Admin).await
}

async fn register(
    state: AppState,
    body: RegisterRequest,
    role: UserRole,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let name = body.name.trim();
    let email = body.email.trim().to_lowercase();

    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if body.password.chars().count() < 8 {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    let password_hash = hash_password(&body.password)?;

    let input = CreateUser {
        name: name.to_string(),
        email: email.clone(),
        phone: body.phone.clone(),
        password_hash,
        role,
    };

    let user = match User::create(input, &state.db_pool).await {
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

    let token = state
        .jwt_service
        .create_token(user.id, user.email.clone(), user.is_admin())?;

    // Best effort: a broken mail relay must not block registration.
    if let Err(err) = state
        .server_deps
        .mailer
        .send(
            &user.email,
            "Welcome to Harborview Stays",
            &format!(
                "Hi {},\n\nYour account is ready. You can now browse rooms and place bookings.\n\nHarborview Stays",
                user.name
            ),
        )
        .await
    {
        tracing::warn!(user_id = %user.id, error = %err, "welcome mail failed");
    }

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// POST /api/auth/login
pub async fn login_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = body.email.trim().to_lowercase();

    // Same response for unknown email and wrong password.
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = User::find_by_email(&email, &state.db_pool)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&body.password, &user.password_hash).unwrap_or(false) {
        return Err(invalid());
    }

    let token = state
        .jwt_service
        .create_token(user.id, user.email.clone(), user.is_admin())?;

    tracing::debug!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
