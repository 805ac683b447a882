//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pixel_spy_core::{Email, UserId};

/// A registered user.
///
/// The password hash is never part of this type; it is only read through
/// `Store::get_user_with_password` during login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address (unique).
    pub email: Email,
    /// Display name.
    pub name: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a user.
#[derive(Debug)]
pub struct NewUser<'a> {
    /// Validated email address.
    pub email: &'a Email,
    /// Display name.
    pub name: &'a str,
    /// Argon2 PHC string.
    pub password_hash: &'a str,
}
