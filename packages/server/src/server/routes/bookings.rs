//! Booking API surface. All routes require authentication; the engine
//! enforces owner/admin rules beyond that.

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::{BookingId, RoomId};
use crate::domains::bookings::{
    Booking, BookingStatus, NewBooking, UpdateBookingFields,
};
use crate::domains::rooms::Room;
use crate::domains::users::User;
use crate::kernel::BookingReport;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::{require_admin, require_user, AuthUser};

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub room_id: RoomId,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub room_id: RoomId,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub guests: i32,
    pub total_amount: Decimal,
    pub special_requests: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateBookingRequest {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub guests: Option<i32>,
    pub total_amount: Option<Decimal>,
    /// Omitted keeps the stored text, explicit `null` clears it.
    #[serde(default, deserialize_with = "provided_field")]
    pub special_requests: Option<Option<String>>,
}

/// Wraps a present field (even a `null` one) in an extra `Some`, so the
/// engine can tell "not sent" from "sent as null".
fn provided_field<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub status: Option<BookingStatus>,
}

/// GET /api/bookings/check-availability
pub async fn check_availability_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let auth = require_user(auth.as_deref())?;

    let available = state
        .engine
        .check_availability(auth.user_id, params.room_id, params.date_from, params.date_to)
        .await?;

    Ok(Json(AvailabilityResponse { available }))
}

/// POST /api/bookings
pub async fn create_booking_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let auth = require_user(auth.as_deref())?;

    let booking = state
        .engine
        .create(
            auth.user_id,
            NewBooking {
                room_id: body.room_id,
                date_from: body.date_from,
                date_to: body.date_to,
                guests: body.guests,
                total_amount: body.total_amount,
                special_requests: body.special_requests,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/bookings
pub async fn list_own_bookings_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    let auth = require_user(auth.as_deref())?;

    let bookings = state.engine.list_own(auth.user_id, params.status).await?;
    Ok(Json(bookings))
}

/// GET /api/bookings/all
pub async fn list_all_bookings_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    let auth = require_user(auth.as_deref())?;

    let bookings = state.engine.list_all(auth.actor(), params.status).await?;
    Ok(Json(bookings))
}

/// GET /api/bookings/:id
pub async fn get_booking_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, ApiError> {
    let auth = require_user(auth.as_deref())?;

    let booking = state.engine.get(auth.actor(), id).await?;
    Ok(Json(booking))
}

/// PUT /api/bookings/:id
pub async fn update_booking_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<BookingId>,
    Json(body): Json<UpdateBookingRequest>,
) -> Result<Json<Booking>, ApiError> {
    let auth = require_user(auth.as_deref())?;

    let booking = state
        .engine
        .update(
            auth.actor(),
            id,
            UpdateBookingFields {
                date_from: body.date_from,
                date_to: body.date_to,
                guests: body.guests,
                total_amount: body.total_amount,
                special_requests: body.special_requests,
            },
        )
        .await?;

    Ok(Json(booking))
}

/// PUT /api/bookings/:id/approve
pub async fn approve_booking_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, ApiError> {
    let auth = require_user(auth.as_deref())?;

    let booking = state.engine.approve(auth.actor(), id).await?;
    Ok(Json(booking))
}

/// PUT /api/bookings/:id/cancel
pub async fn cancel_booking_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, ApiError> {
    let auth = require_user(auth.as_deref())?;

    let booking = state.engine.cancel(auth.actor(), id).await?;
    Ok(Json(booking))
}

/// GET /api/bookings/:id/report
///
/// Renders the booking as a printable document, served inline.
pub async fn booking_report_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<BookingId>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = require_admin(auth.as_deref())?;

    let booking = state.engine.get(auth.actor(), id).await?;

    let guest = User::find_by_id_optional(booking.user_id, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("user"))?;
    let room = Room::find_by_id_optional(booking.room_id, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("room"))?;

    let report = BookingReport::assemble(&booking, &guest, &room);
    let renderer = &state.server_deps.report_renderer;
    let document = renderer.render(&report)?;

    Ok((
        [
            (header::CONTENT_TYPE, renderer.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"booking-{}.html\"", booking.id),
            ),
        ],
        document,
    ))
}
