use thiserror::Error;

/// Booking engine errors, ordered roughly by the validation sequence that
/// produces them. Each variant carries a stable machine-readable code so
/// API clients can branch without parsing messages.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bookings must be placed at least {required_days} days before the start date")]
    LeadTimeViolation { required_days: i64 },

    #[error("You already have {limit} bookings starting that day")]
    UserQuotaExceeded { limit: i64 },

    #[error("The system has reached its capacity of {limit} bookings for that day")]
    SystemQuotaExceeded { limit: i64 },

    #[error("Room is unavailable for the requested dates")]
    Unavailable,

    #[error("Permission denied")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        BookingError::Store(err.into())
    }
}

impl BookingError {
    /// Stable code for API payloads and logs.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::InvalidInput(_) => "invalid_input",
            BookingError::LeadTimeViolation { .. } => "lead_time_violation",
            BookingError::UserQuotaExceeded { .. } => "user_quota_exceeded",
            BookingError::SystemQuotaExceeded { .. } => "system_quota_exceeded",
            BookingError::Unavailable => "unavailable",
            BookingError::Forbidden => "forbidden",
            BookingError::NotFound(_) => "not_found",
            BookingError::Store(_) => "storage_error",
        }
    }
}
