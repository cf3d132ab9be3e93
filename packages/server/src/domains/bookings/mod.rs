//! Bookings domain - availability checks and the booking lifecycle

pub mod engine;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use engine::{BookingEngine, BookingPolicy};
pub use error::BookingError;
pub use models::booking::{
    Booking, BookingStatus, NewBooking, PaymentStatus, UpdateBookingFields,
};
