//! Users domain - guest accounts, admin accounts, and the address book

pub mod models;

// Re-export commonly used types
pub use models::address::{Address, CreateAddress, UpdateAddress};
pub use models::user::{CreateUser, UpdateUser, User, UserPublic, UserRole};
