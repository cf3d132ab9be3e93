//! Availability and lifecycle engine - the rules governing whether a room
//! can be booked for a date window and how a booking moves between states.
//!
//! Every mutation is a request-per-call unit of work against shared Postgres
//! state. The create and reschedule paths run their validate+write critical
//! section inside a transaction that first locks the room row, so concurrent
//! writers on the same room serialize and at most one overlapping booking
//! survives. `check_availability` is read-only and does not lock; its answer
//! can go stale before a follow-up create, which is why create re-runs the
//! full validation sequence at write time.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::common::{Actor, BookingId, RoomId, UserId};
use crate::domains::rooms::Room;

use super::error::BookingError;
use super::models::booking::{
    Booking, BookingStatus, NewBooking, PaymentStatus, UpdateBookingFields,
};

/// Booking rules, injected at construction so deployments and tests can
/// vary them without touching the engine.
#[derive(Debug, Clone, Copy)]
pub struct BookingPolicy {
    /// Minimum days between now and a booking's start.
    pub lead_time_days: i64,
    /// Max non-cancelled bookings one user may start on a single UTC date.
    pub max_user_bookings_per_day: i64,
    /// Max non-cancelled bookings the whole system admits per UTC date.
    pub max_system_bookings_per_day: i64,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            lead_time_days: 3,
            max_user_bookings_per_day: 5,
            max_system_bookings_per_day: 30,
        }
    }
}

#[derive(Clone)]
pub struct BookingEngine {
    pool: PgPool,
    policy: BookingPolicy,
}

impl BookingEngine {
    pub fn new(pool: PgPool, policy: BookingPolicy) -> Self {
        Self { pool, policy }
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    /// Can `user_id` book this room for this window right now?
    ///
    /// Runs the same validation sequence as `create` but without locking,
    /// so the answer is advisory: a concurrent writer can take the slot
    /// between this check and a follow-up create. Quota violations surface
    /// as errors; an overlap is a normal negative answer.
    pub async fn check_availability(
        &self,
        user_id: UserId,
        room_id: RoomId,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> Result<bool, BookingError> {
        validate_range(date_from, date_to)?;
        self.validate_lead_time(date_from)?;

        if Room::find_by_id_optional(room_id, &self.pool)
            .await?
            .is_none()
        {
            return Err(BookingError::NotFound("room"));
        }

        let mut conn = self.pool.acquire().await?;
        self.validate_quotas(user_id, date_from, &mut *conn).await?;

        let taken =
            Booking::overlap_exists(room_id, date_from, date_to, None, &mut *conn).await?;
        Ok(!taken)
    }

    /// Create a booking for `owner`, re-running the full validation sequence
    /// at write time under the room lock. An overlap here is the
    /// `Unavailable` conflict error rather than a negative answer.
    ///
    /// `total_amount` is taken as supplied once it passes the non-negative
    /// check; the engine does not recompute nights x price from the room.
    pub async fn create(
        &self,
        owner: UserId,
        input: NewBooking,
    ) -> Result<Booking, BookingError> {
        validate_range(input.date_from, input.date_to)?;
        validate_details(input.guests, input.total_amount, input.special_requests.as_deref())?;
        self.validate_lead_time(input.date_from)?;

        let mut tx = self.pool.begin().await?;

        // Serialization point: concurrent creates for this room queue here.
        if Room::lock_for_update(input.room_id, &mut *tx).await?.is_none() {
            return Err(BookingError::NotFound("room"));
        }

        self.validate_quotas(owner, input.date_from, &mut *tx).await?;

        if Booking::overlap_exists(input.room_id, input.date_from, input.date_to, None, &mut *tx)
            .await?
        {
            return Err(BookingError::Unavailable);
        }

        let booking = Booking::insert(owner, &input, &mut *tx).await?;
        tx.commit().await?;

        tracing::info!(
            booking_id = %booking.id,
            room_id = %booking.room_id,
            user_id = %owner,
            "booking created"
        );
        Ok(booking)
    }

    /// Approve a pending booking: `booked`/`paid`. Admin only.
    ///
    /// Approval does not re-check overlap or quotas; a conflict that arose
    /// after creation does not block it. Approving an already approved
    /// booking succeeds and leaves it approved.
    ///
    /// Deliberate deviation: approving a cancelled booking is rejected as
    /// `InvalidInput` instead of flipping it back to `booked`/`paid`.
    /// Cancellation frees the window for other guests, so it is terminal;
    /// a cancelled stay is re-booked through the normal create path, which
    /// re-runs the calendar rules.
    pub async fn approve(&self, actor: Actor, id: BookingId) -> Result<Booking, BookingError> {
        if !actor.is_admin {
            return Err(BookingError::Forbidden);
        }

        let booking = Booking::find_by_id_optional(id, &self.pool)
            .await?
            .ok_or(BookingError::NotFound("booking"))?;

        match booking.status()? {
            BookingStatus::Cancelled => Err(BookingError::InvalidInput(
                "cannot approve a cancelled booking".to_string(),
            )),
            BookingStatus::Pending | BookingStatus::Booked => {
                let updated =
                    Booking::set_status(id, BookingStatus::Booked, PaymentStatus::Paid, &self.pool)
                        .await?;
                tracing::info!(booking_id = %id, admin_id = %actor.user_id, "booking approved");
                Ok(updated)
            }
        }
    }

    /// Cancel a booking: `cancelled`/`refunded`. Owner or admin.
    ///
    /// Idempotent: cancelling a cancelled booking succeeds unchanged. The
    /// freed window immediately stops counting toward overlap and quotas.
    pub async fn cancel(&self, actor: Actor, id: BookingId) -> Result<Booking, BookingError> {
        let booking = Booking::find_by_id_optional(id, &self.pool)
            .await?
            .ok_or(BookingError::NotFound("booking"))?;

        if !actor.can_manage(booking.user_id) {
            return Err(BookingError::Forbidden);
        }

        if booking.status()? == BookingStatus::Cancelled {
            return Ok(booking);
        }

        let updated = Booking::set_status(
            id,
            BookingStatus::Cancelled,
            PaymentStatus::Refunded,
            &self.pool,
        )
        .await?;
        tracing::info!(booking_id = %id, user_id = %actor.user_id, "booking cancelled");
        Ok(updated)
    }

    /// Update a booking's allow-listed fields. Owner or admin.
    ///
    /// When either date changes the engine re-validates range, lead time
    /// and overlap (excluding the booking itself) under the room lock, the
    /// same critical section create uses. Quotas are not re-checked: the
    /// booking already holds its slot for the day.
    pub async fn update(
        &self,
        actor: Actor,
        id: BookingId,
        fields: UpdateBookingFields,
    ) -> Result<Booking, BookingError> {
        let booking = Booking::find_by_id_optional(id, &self.pool)
            .await?
            .ok_or(BookingError::NotFound("booking"))?;

        if !actor.can_manage(booking.user_id) {
            return Err(BookingError::Forbidden);
        }

        // Two-level option: Some(None) clears the text, outer None keeps it.
        let effective_requests = match &fields.special_requests {
            Some(provided) => provided.as_deref(),
            None => booking.special_requests.as_deref(),
        };
        validate_details(
            fields.guests.unwrap_or(booking.guests),
            fields.total_amount.unwrap_or(booking.total_amount),
            effective_requests,
        )?;

        let dates_changed = fields.date_from.is_some() || fields.date_to.is_some();
        if !dates_changed {
            let mut conn = self.pool.acquire().await?;
            return Ok(Booking::update_fields(id, &fields, &mut *conn).await?);
        }

        let new_from = fields.date_from.unwrap_or(booking.date_from);
        let new_to = fields.date_to.unwrap_or(booking.date_to);
        validate_range(new_from, new_to)?;
        self.validate_lead_time(new_from)?;

        let mut tx = self.pool.begin().await?;

        if Room::lock_for_update(booking.room_id, &mut *tx).await?.is_none() {
            return Err(BookingError::NotFound("room"));
        }

        if Booking::overlap_exists(booking.room_id, new_from, new_to, Some(id), &mut *tx).await? {
            return Err(BookingError::Unavailable);
        }

        let updated = Booking::update_fields(id, &fields, &mut *tx).await?;
        tx.commit().await?;

        tracing::info!(booking_id = %id, user_id = %actor.user_id, "booking rescheduled");
        Ok(updated)
    }

    /// Fetch one booking. Owner or admin.
    pub async fn get(&self, actor: Actor, id: BookingId) -> Result<Booking, BookingError> {
        let booking = Booking::find_by_id_optional(id, &self.pool)
            .await?
            .ok_or(BookingError::NotFound("booking"))?;

        if !actor.can_manage(booking.user_id) {
            return Err(BookingError::Forbidden);
        }

        Ok(booking)
    }

    /// A user's own bookings, optionally filtered by status.
    pub async fn list_own(
        &self,
        user_id: UserId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, BookingError> {
        Ok(Booking::find_for_user(user_id, status, &self.pool).await?)
    }

    /// Every booking in the system. Admin only.
    pub async fn list_all(
        &self,
        actor: Actor,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, BookingError> {
        if !actor.is_admin {
            return Err(BookingError::Forbidden);
        }
        Ok(Booking::find_all(status, &self.pool).await?)
    }

    fn validate_lead_time(&self, date_from: DateTime<Utc>) -> Result<(), BookingError> {
        if date_from < Utc::now() + Duration::days(self.policy.lead_time_days) {
            return Err(BookingError::LeadTimeViolation {
                required_days: self.policy.lead_time_days,
            });
        }
        Ok(())
    }

    /// Quota checks count non-cancelled bookings starting on the same UTC
    /// date as the requested start. Runs on the caller's connection so the
    /// create path sees them inside its transaction.
    async fn validate_quotas(
        &self,
        user_id: UserId,
        date_from: DateTime<Utc>,
        conn: &mut PgConnection,
    ) -> Result<(), BookingError> {
        let (day_start, day_end) = utc_day_window(date_from);

        let user_count =
            Booking::count_for_user_starting_between(user_id, day_start, day_end, conn).await?;
        if user_count >= self.policy.max_user_bookings_per_day {
            return Err(BookingError::UserQuotaExceeded {
                limit: self.policy.max_user_bookings_per_day,
            });
        }

        let system_count =
            Booking::count_all_starting_between(day_start, day_end, conn).await?;
        if system_count >= self.policy.max_system_bookings_per_day {
            return Err(BookingError::SystemQuotaExceeded {
                limit: self.policy.max_system_bookings_per_day,
            });
        }

        Ok(())
    }
}

fn validate_range(date_from: DateTime<Utc>, date_to: DateTime<Utc>) -> Result<(), BookingError> {
    if date_from >= date_to {
        return Err(BookingError::InvalidInput(
            "date_from must be before date_to".to_string(),
        ));
    }
    Ok(())
}

fn validate_details(
    guests: i32,
    total_amount: Decimal,
    special_requests: Option<&str>,
) -> Result<(), BookingError> {
    if guests < 1 {
        return Err(BookingError::InvalidInput(
            "guests must be at least 1".to_string(),
        ));
    }
    if total_amount < Decimal::ZERO {
        return Err(BookingError::InvalidInput(
            "total_amount must not be negative".to_string(),
        ));
    }
    if let Some(requests) = special_requests {
        if requests.chars().count() > 500 {
            return Err(BookingError::InvalidInput(
                "special_requests must be at most 500 characters".to_string(),
            ));
        }
    }
    Ok(())
}

/// The UTC calendar day containing `instant`, as a `[start, end)` window.
fn utc_day_window(instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = instant.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_range_validation() {
        let from = Utc.with_ymd_and_hms(2026, 9, 10, 12, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2026, 9, 12, 12, 0, 0).unwrap();
        assert!(validate_range(from, to).is_ok());
        assert!(matches!(
            validate_range(to, from),
            Err(BookingError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_range(from, from),
            Err(BookingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_detail_validation() {
        assert!(validate_details(1, Decimal::ZERO, None).is_ok());
        assert!(validate_details(0, Decimal::ZERO, None).is_err());
        assert!(validate_details(2, Decimal::from(-1), None).is_err());
        let long = "x".repeat(501);
        assert!(validate_details(2, Decimal::from(100), Some(&long)).is_err());
        assert!(validate_details(2, Decimal::from(100), Some("late checkout")).is_ok());
    }

    #[test]
    fn test_utc_day_window_covers_exactly_one_day() {
        let instant = Utc.with_ymd_and_hms(2026, 9, 10, 23, 59, 59).unwrap();
        let (start, end) = utc_day_window(instant);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 9, 10, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 9, 11, 0, 0, 0).unwrap());
        assert!(start <= instant && instant < end);
    }

    #[test]
    fn test_default_policy_values() {
        let policy = BookingPolicy::default();
        assert_eq!(policy.lead_time_days, 3);
        assert_eq!(policy.max_user_bookings_per_day, 5);
        assert_eq!(policy.max_system_bookings_per_day, 30);
    }
}
