// Harborview Stays - Booking API Core
//
// This crate provides the backend API for a room-booking service: accounts,
// room inventory, and the booking availability/lifecycle engine.
// Architecture follows domain-driven design; the engine owns all booking
// rules and the HTTP layer stays thin.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
