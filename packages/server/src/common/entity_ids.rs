//! Entity markers and the `Id` aliases used across the domain models.

use super::id::Id;

pub struct User;
pub struct Room;
pub struct Booking;
pub struct Address;

pub type UserId = Id<User>;
pub type RoomId = Id<Room>;
pub type BookingId = Id<Booking>;
pub type AddressId = Id<Address>;
