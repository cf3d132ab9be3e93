// Business domains
pub mod auth;
pub mod bookings;
pub mod rooms;
pub mod users;
