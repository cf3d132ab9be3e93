//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly. Emails carry a UUID so
//! fixtures never collide across tests sharing the database.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use server_core::domains::auth::hash_password;
use server_core::domains::bookings::NewBooking;
use server_core::domains::rooms::{CreateRoom, Room};
use server_core::domains::users::{CreateUser, User, UserRole};

/// Create a guest account with a unique email.
pub async fn create_test_user(pool: &PgPool) -> Result<User> {
    create_user_with_role(pool, UserRole::User).await
}

/// Create an administrator account with a unique email.
pub async fn create_test_admin(pool: &PgPool) -> Result<User> {
    create_user_with_role(pool, UserRole::Admin).await
}

async fn create_user_with_role(pool: &PgPool, role: UserRole) -> Result<User> {
    User::create(
        CreateUser {
            name: "Test Guest".to_string(),
            email: format!("guest-{}@example.com", Uuid::new_v4()),
            phone: None,
            password_hash: hash_password("correct horse battery")?,
            role,
        },
        pool,
    )
    .await
}

/// Create a room priced at 100.00 per night.
pub async fn create_test_room(pool: &PgPool) -> Result<Room> {
    create_test_room_priced(pool, Decimal::new(10000, 2)).await
}

pub async fn create_test_room_priced(pool: &PgPool, price: Decimal) -> Result<Room> {
    Room::create(
        CreateRoom {
            name: format!("Room {}", &Uuid::new_v4().to_string()[..8]),
            location: "Test Wing".to_string(),
            capacity: 2,
            price,
            description: None,
            image: None,
        },
        pool,
    )
    .await
}

/// A booking request starting `from_days` from now and ending `to_days`
/// from now, priced at 100.00 per night.
pub fn booking_window(room: &Room, from_days: i64, to_days: i64) -> NewBooking {
    let nights = to_days - from_days;
    NewBooking {
        room_id: room.id,
        date_from: days_from_now(from_days),
        date_to: days_from_now(to_days),
        guests: 2,
        total_amount: Decimal::new(10000 * nights, 2),
        special_requests: None,
    }
}

/// Noon UTC `days` days out. Fixed time-of-day keeps window boundaries
/// exact across repeated calls and keeps day-bucket quota tests away from
/// the midnight rollover.
pub fn days_from_now(days: i64) -> DateTime<Utc> {
    (Utc::now() + Duration::days(days))
        .date_naive()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
}
