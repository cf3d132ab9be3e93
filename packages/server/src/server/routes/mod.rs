// HTTP route handlers
pub mod addresses;
pub mod auth;
pub mod bookings;
pub mod health;
pub mod rooms;
pub mod users;

pub use addresses::*;
pub use auth::*;
pub use bookings::*;
pub use health::*;
pub use rooms::*;
pub use users::*;
