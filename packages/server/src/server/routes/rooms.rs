//! Room catalog. Listing and fetching are public; mutation is admin-only.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::common::RoomId;
use crate::domains::rooms::{CreateRoom, Room, UpdateRoom};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::{require_admin, AuthUser};

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    pub location: String,
    pub capacity: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateRoomRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// GET /api/rooms
pub async fn list_rooms_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Room>>, ApiError> {
    let rooms = Room::find_all(&state.db_pool).await?;
    Ok(Json(rooms))
}

/// GET /api/rooms/:id
pub async fn get_room_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<RoomId>,
) -> Result<Json<Room>, ApiError> {
    let room = Room::find_by_id_optional(id, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("room"))?;
    Ok(Json(room))
}

/// POST /api/admin/rooms
pub async fn create_room_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    require_admin(auth.as_deref())?;
    validate_room_fields(Some(&body.name), Some(&body.location), Some(body.capacity), Some(body.price))?;

    let room = Room::create(
        CreateRoom {
            name: body.name.trim().to_string(),
            location: body.location.trim().to_string(),
            capacity: body.capacity,
            price: body.price,
            description: body.description,
            image: body.image,
        },
        &state.db_pool,
    )
    .await?;

    tracing::info!(room_id = %room.id, "room created");
    Ok((StatusCode::CREATED, Json(room)))
}

/// PUT /api/admin/rooms/:id
pub async fn update_room_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<RoomId>,
    Json(body): Json<UpdateRoomRequest>,
) -> Result<Json<Room>, ApiError> {
    require_admin(auth.as_deref())?;
    validate_room_fields(
        body.name.as_deref(),
        body.location.as_deref(),
        body.capacity,
        body.price,
    )?;

    if Room::find_by_id_optional(id, &state.db_pool).await?.is_none() {
        return Err(ApiError::not_found("room"));
    }

    let room = Room::update(
        id,
        UpdateRoom {
            name: body.name.map(|n| n.trim().to_string()),
            location: body.location.map(|l| l.trim().to_string()),
            capacity: body.capacity,
            price: body.price,
            description: body.description,
            image: body.image,
        },
        &state.db_pool,
    )
    .await?;

    Ok(Json(room))
}

fn validate_room_fields(
    name: Option<&str>,
    location: Option<&str>,
    capacity: Option<i32>,
    price: Option<Decimal>,
) -> Result<(), ApiError> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Room name must not be empty"));
        }
    }
    if let Some(location) = location {
        if location.trim().is_empty() {
            return Err(ApiError::bad_request("Room location must not be empty"));
        }
    }
    if let Some(capacity) = capacity {
        if capacity < 1 {
            return Err(ApiError::bad_request("Capacity must be at least 1"));
        }
    }
    if let Some(price) = price {
        if price < Decimal::ZERO {
            return Err(ApiError::bad_request("Price must not be negative"));
        }
    }
    Ok(())
}
