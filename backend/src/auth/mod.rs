//! Authentication module
//!
//! The credential and token security layer: bcrypt password hashing and
//! HS256 access/refresh tokens validated against an injectable clock.

mod clock;
mod jwt;
mod middleware;
mod password;

pub use clock::{Clock, ManualClock, SystemClock};
pub use jwt::{Claims, JwtKeys, TokenAuthority, TokenPair, TokenTtl, ALGORITHM, MAX_TTL_SECS};
pub use middleware::AuthUser;
pub use password::{PasswordService, DEFAULT_COST, MAX_COST, MIN_COST};
