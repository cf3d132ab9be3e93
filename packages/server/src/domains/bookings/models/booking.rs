use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{BookingId, RoomId, UserId};

/// Booking status enum for type-safe querying
///
/// Lifecycle: pending -> booked (admin approval) and pending/booked ->
/// cancelled. Cancelled is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Booked,
    Cancelled,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Booked => write!(f, "booked"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "booked" => Ok(BookingStatus::Booked),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Invalid booking status: {}", s)),
        }
    }
}

/// Payment status tracked alongside the booking lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "unpaid"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(anyhow::anyhow!("Invalid payment status: {}", s)),
        }
    }
}

/// Booking model - a guest's reservation of one room for a date window
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub room_id: RoomId,

    // The reserved window. Boundaries are inclusive for conflict purposes:
    // a booking ending at instant T conflicts with one starting at T.
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,

    pub guests: i32,
    pub total_amount: Decimal,
    pub special_requests: Option<String>,

    pub status: String,
    pub payment_status: String,

    // Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a booking
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub room_id: RoomId,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub guests: i32,
    pub total_amount: Decimal,
    pub special_requests: Option<String>,
}

/// Input for updating a booking's mutable fields. `None` leaves a field
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateBookingFields {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub guests: Option<i32>,
    pub total_amount: Option<Decimal>,
    /// Two-level option: `Some(None)` clears the stored request text,
    /// outer `None` keeps it.
    pub special_requests: Option<Option<String>>,
}

impl Booking {
    pub fn status(&self) -> Result<BookingStatus> {
        self.status.parse()
    }

    pub fn payment_status(&self) -> Result<PaymentStatus> {
        self.payment_status.parse()
    }

    /// Find booking by ID
    pub async fn find_by_id(id: BookingId, pool: &PgPool) -> Result<Self> {
        let booking = sqlx::query_as::<_, Self>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(booking)
    }

    /// Find booking by ID, returning None if not found
    pub async fn find_by_id_optional(id: BookingId, pool: &PgPool) -> Result<Option<Self>> {
        let booking = sqlx::query_as::<_, Self>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(booking)
    }

    /// Find a user's bookings, optionally filtered by status, newest first
    pub async fn find_for_user(
        user_id: UserId,
        status: Option<BookingStatus>,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let bookings = match status {
            Some(status) => {
                sqlx::query_as::<_, Self>(
                    "SELECT * FROM bookings
                     WHERE user_id = $1 AND status = $2
                     ORDER BY created_at DESC",
                )
                .bind(user_id)
                .bind(status.to_string())
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Self>(
                    "SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
                )
                .bind(user_id)
                .fetch_all(pool)
                .await?
            }
        };
        Ok(bookings)
    }

    /// Find all bookings, optionally filtered by status, newest first
    pub async fn find_all(status: Option<BookingStatus>, pool: &PgPool) -> Result<Vec<Self>> {
        let bookings = match status {
            Some(status) => {
                sqlx::query_as::<_, Self>(
                    "SELECT * FROM bookings WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(status.to_string())
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Self>("SELECT * FROM bookings ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await?
            }
        };
        Ok(bookings)
    }

    /// True if any live booking for the room intersects the window.
    ///
    /// Boundaries are inclusive on both sides; `exclude` lets the
    /// reschedule path ignore the booking being moved. Runs on a connection
    /// so the caller can hold the room lock while checking.
    pub async fn overlap_exists(
        room_id: RoomId,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
        exclude: Option<BookingId>,
        conn: &mut PgConnection,
    ) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE room_id = $1
                  AND status <> 'cancelled'
                  AND date_from <= $3
                  AND date_to >= $2
                  AND ($4::uuid IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(room_id)
        .bind(date_from)
        .bind(date_to)
        .bind(exclude)
        .fetch_one(conn)
        .await?;
        Ok(exists)
    }

    /// Count a user's live bookings starting inside `[from, to)`
    pub async fn count_for_user_starting_between(
        user_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        conn: &mut PgConnection,
    ) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings
             WHERE user_id = $1
               AND status <> 'cancelled'
               AND date_from >= $2 AND date_from < $3",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(conn)
        .await?;
        Ok(count)
    }

    /// Count all live bookings starting inside `[from, to)`
    pub async fn count_all_starting_between(
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        conn: &mut PgConnection,
    ) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings
             WHERE status <> 'cancelled'
               AND date_from >= $1 AND date_from < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(conn)
        .await?;
        Ok(count)
    }

    /// Insert a new pending booking. Runs on a connection so the engine can
    /// insert inside its validation transaction.
    pub async fn insert(
        user_id: UserId,
        input: &NewBooking,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        let booking = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO bookings (
                id, user_id, room_id, date_from, date_to,
                guests, total_amount, special_requests, status, payment_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', 'unpaid')
            RETURNING *
            "#,
        )
        .bind(BookingId::new())
        .bind(user_id)
        .bind(input.room_id)
        .bind(input.date_from)
        .bind(input.date_to)
        .bind(input.guests)
        .bind(input.total_amount)
        .bind(&input.special_requests)
        .fetch_one(conn)
        .await?;
        Ok(booking)
    }

    /// Move a booking to a new lifecycle state
    pub async fn set_status(
        id: BookingId,
        status: BookingStatus,
        payment_status: PaymentStatus,
        pool: &PgPool,
    ) -> Result<Self> {
        let booking = sqlx::query_as::<_, Self>(
            "UPDATE bookings SET status = $2, payment_status = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(status.to_string())
        .bind(payment_status.to_string())
        .fetch_one(pool)
        .await?;
        Ok(booking)
    }

    /// Update a booking's mutable fields. Runs on a connection so the
    /// engine can revalidate and write under the room lock.
    ///
    /// `special_requests` bypasses COALESCE: an explicit null must be able
    /// to clear the column, so a separate flag signals whether the field
    /// was provided at all.
    pub async fn update_fields(
        id: BookingId,
        input: &UpdateBookingFields,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        let booking = sqlx::query_as::<_, Self>(
            r#"
            UPDATE bookings SET
                date_from = COALESCE($2, date_from),
                date_to = COALESCE($3, date_to),
                guests = COALESCE($4, guests),
                total_amount = COALESCE($5, total_amount),
                special_requests = CASE WHEN $6 THEN $7 ELSE special_requests END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.date_from)
        .bind(input.date_to)
        .bind(input.guests)
        .bind(input.total_amount)
        .bind(input.special_requests.is_some())
        .bind(input.special_requests.as_ref().and_then(|v| v.as_deref()))
        .fetch_one(conn)
        .await?;
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Booked,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(
                BookingStatus::from_str(&status.to_string()).unwrap(),
                status
            );
        }
        assert!(BookingStatus::from_str("confirmed").is_err());
    }

    #[test]
    fn test_only_cancelled_is_terminal() {
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::Booked.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_payment_status_roundtrip() {
        for status in [
            PaymentStatus::Unpaid,
            PaymentStatus::Paid,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(
                PaymentStatus::from_str(&status.to_string()).unwrap(),
                status
            );
        }
    }
}
