use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::common::RoomId;

/// Room model - admin-managed inventory
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub location: String,
    pub capacity: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub image: Option<String>,

    // Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a room
#[derive(Debug, Clone)]
pub struct CreateRoom {
    pub name: String,
    pub location: String,
    pub capacity: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Input for updating a room. `None` leaves a field unchanged; the
/// optional text columns (description, image) cannot be cleared back to
/// null through this partial update.
#[derive(Debug, Clone, Default)]
pub struct UpdateRoom {
    pub name: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl Room {
    /// Find room by ID
    pub async fn find_by_id(id: RoomId, pool: &PgPool) -> Result<Self> {
        let room = sqlx::query_as::<_, Self>("SELECT * FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(room)
    }

    /// Find room by ID, returning None if not found
    pub async fn find_by_id_optional(id: RoomId, pool: &PgPool) -> Result<Option<Self>> {
        let room = sqlx::query_as::<_, Self>("SELECT * FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(room)
    }

    /// Find all rooms, newest first
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let rooms = sqlx::query_as::<_, Self>("SELECT * FROM rooms ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;
        Ok(rooms)
    }

    /// Lock a room row for the rest of the transaction.
    ///
    /// Serializes concurrent booking attempts on the same room: the second
    /// writer blocks here until the first commits, then sees its rows.
    pub async fn lock_for_update(id: RoomId, conn: &mut PgConnection) -> Result<Option<Self>> {
        let room = sqlx::query_as::<_, Self>("SELECT * FROM rooms WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(room)
    }

    /// Create a room
    pub async fn create(input: CreateRoom, pool: &PgPool) -> Result<Self> {
        let room = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO rooms (id, name, location, capacity, price, description, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(RoomId::new())
        .bind(&input.name)
        .bind(&input.location)
        .bind(input.capacity)
        .bind(input.price)
        .bind(&input.description)
        .bind(&input.image)
        .fetch_one(pool)
        .await?;
        Ok(room)
    }

    /// Update a room
    pub async fn update(id: RoomId, input: UpdateRoom, pool: &PgPool) -> Result<Self> {
        let room = sqlx::query_as::<_, Self>(
            r#"
            UPDATE rooms SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                capacity = COALESCE($4, capacity),
                price = COALESCE($5, price),
                description = COALESCE($6, description),
                image = COALESCE($7, image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.location)
        .bind(input.capacity)
        .bind(input.price)
        .bind(&input.description)
        .bind(&input.image)
        .fetch_one(pool)
        .await?;
        Ok(room)
    }
}
