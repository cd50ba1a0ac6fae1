//! Auth Service Shared Library
//!
//! Wire types, the credential/token error taxonomy and input validation
//! shared between the backend and its clients.

pub mod errors;
pub mod mask;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use mask::mask_email;
pub use types::*;
