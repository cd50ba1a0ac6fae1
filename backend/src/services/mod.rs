//! Business logic services
//!
//! Services coordinate the credential layer with user storage.

pub mod user;

pub use user::UserService;
