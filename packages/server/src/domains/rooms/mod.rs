//! Rooms domain - the bookable inventory

pub mod models;

// Re-export commonly used types
pub use models::room::{CreateRoom, Room, UpdateRoom};
