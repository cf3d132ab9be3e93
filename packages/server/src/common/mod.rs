pub mod auth;
pub mod entity_ids;
pub mod id;

pub use auth::Actor;
pub use entity_ids::{AddressId, BookingId, RoomId, UserId};
pub use id::{Id, V4, V7};
