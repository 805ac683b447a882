//! Domain models.
//!
//! These types are what the store returns and what handlers serialize. Row
//! types used for decoding live next to the queries in `crate::db`.

pub mod record;
pub mod spy;
pub mod user;

pub use record::Record;
pub use spy::{Spy, SpyChanges};
pub use user::{NewUser, User};
