use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::common::{AddressId, UserId};

/// Address model - per-user address book
///
/// At most one address per user is active at a time; `set_active` enforces
/// this transactionally.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub is_active: bool,

    // Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an address
#[derive(Debug, Clone)]
pub struct CreateAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
}

/// Input for updating an address
#[derive(Debug, Clone, Default)]
pub struct UpdateAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
}

impl Address {
    /// Find address by ID, returning None if not found
    pub async fn find_by_id_optional(id: AddressId, pool: &PgPool) -> Result<Option<Self>> {
        let address = sqlx::query_as::<_, Self>("SELECT * FROM addresses WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(address)
    }

    /// Find all addresses for a user, active first then newest first
    pub async fn find_for_user(user_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        let addresses = sqlx::query_as::<_, Self>(
            "SELECT * FROM addresses WHERE user_id = $1 ORDER BY is_active DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(addresses)
    }

    /// Create an address. The user's first address becomes active automatically.
    pub async fn create(user_id: UserId, input: CreateAddress, pool: &PgPool) -> Result<Self> {
        let mut tx = pool.begin().await?;

        let (existing,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;

        let address = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO addresses (id, user_id, street, city, state, country, zip_code, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(AddressId::new())
        .bind(user_id)
        .bind(&input.street)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.country)
        .bind(&input.zip_code)
        .bind(existing == 0)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    /// Update an address
    pub async fn update(id: AddressId, input: UpdateAddress, pool: &PgPool) -> Result<Self> {
        let address = sqlx::query_as::<_, Self>(
            r#"
            UPDATE addresses SET
                street = COALESCE($2, street),
                city = COALESCE($3, city),
                state = COALESCE($4, state),
                country = COALESCE($5, country),
                zip_code = COALESCE($6, zip_code),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.street)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.country)
        .bind(&input.zip_code)
        .fetch_one(pool)
        .await?;
        Ok(address)
    }

    /// Make one address the user's active address, deactivating the rest
    pub async fn set_active(id: AddressId, user_id: UserId, pool: &PgPool) -> Result<Self> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE addresses SET is_active = FALSE, updated_at = NOW() WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let address = sqlx::query_as::<_, Self>(
            "UPDATE addresses SET is_active = TRUE, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    /// Delete an address. If it was active, the user's oldest remaining
    /// address is promoted.
    pub async fn delete(id: AddressId, user_id: UserId, pool: &PgPool) -> Result<()> {
        let mut tx = pool.begin().await?;

        let deleted: Option<(bool,)> = sqlx::query_as(
            "DELETE FROM addresses WHERE id = $1 AND user_id = $2 RETURNING is_active",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some((was_active,)) = deleted {
            if was_active {
                sqlx::query(
                    "UPDATE addresses SET is_active = TRUE, updated_at = NOW()
                     WHERE id = (
                         SELECT id FROM addresses
                         WHERE user_id = $1
                         ORDER BY created_at ASC
                         LIMIT 1
                     )",
                )
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
