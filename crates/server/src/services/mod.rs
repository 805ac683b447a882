//! Business logic services.
//!
//! Services borrow a `&dyn Store` for the duration of one request and hold
//! no state of their own.
//!
//! - `auth` - Registration, login and bearer tokens
//! - `spies` - Spies, pixel visits and record management

pub mod auth;
pub mod spies;

pub use auth::{AuthError, AuthService, JwtManager};
pub use spies::{SpyError, SpyService};
