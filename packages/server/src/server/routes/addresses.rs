//! Address book. Strictly owner-scoped: an address belonging to someone
//! else behaves as if it does not exist.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::common::AddressId;
use crate::domains::users::{Address, CreateAddress, UpdateAddress};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::{require_user, AuthUser};

#[derive(Debug, Deserialize, Default)]
pub struct AddressRequest {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
}

/// GET /api/addresses
pub async fn list_addresses_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Vec<Address>>, ApiError> {
    let auth = require_user(auth.as_deref())?;

    let addresses = Address::find_for_user(auth.user_id, &state.db_pool).await?;
    Ok(Json(addresses))
}

/// POST /api/addresses
pub async fn create_address_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<AddressRequest>,
) -> Result<(StatusCode, Json<Address>), ApiError> {
    let auth = require_user(auth.as_deref())?;

    let address = Address::create(
        auth.user_id,
        CreateAddress {
            street: body.street,
            city: body.city,
            state: body.state,
            country: body.country,
            zip_code: body.zip_code,
        },
        &state.db_pool,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(address)))
}

/// PUT /api/addresses/:id
pub async fn update_address_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<AddressId>,
    Json(body): Json<AddressRequest>,
) -> Result<Json<Address>, ApiError> {
    let auth = require_user(auth.as_deref())?;
    owned_address(id, auth, &state).await?;

    let address = Address::update(
        id,
        UpdateAddress {
            street: body.street,
            city: body.city,
            state: body.state,
            country: body.country,
            zip_code: body.zip_code,
        },
        &state.db_pool,
    )
    .await?;

    Ok(Json(address))
}

/// PUT /api/addresses/:id/set-active
pub async fn set_active_address_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<AddressId>,
) -> Result<Json<Address>, ApiError> {
    let auth = require_user(auth.as_deref())?;
    owned_address(id, auth, &state).await?;

    let address = Address::set_active(id, auth.user_id, &state.db_pool).await?;
    Ok(Json(address))
}

/// DELETE /api/addresses/:id
pub async fn delete_address_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<AddressId>,
) -> Result<StatusCode, ApiError> {
    let auth = require_user(auth.as_deref())?;
    owned_address(id, auth, &state).await?;

    Address::delete(id, auth.user_id, &state.db_pool).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn owned_address(id: AddressId, auth: &AuthUser, state: &AppState) -> Result<(), ApiError> {
    match Address::find_by_id_optional(id, &state.db_pool).await? {
        Some(address) if address.user_id == auth.user_id => Ok(()),
        _ => Err(ApiError::not_found("address")),
    }
}
