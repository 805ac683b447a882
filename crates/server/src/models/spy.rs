//! Spy domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pixel_spy_core::{HexColor, SpyId, SpyName, UserId};

/// A tracked entity with a public pixel URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spy {
    /// Unique spy ID (also the pixel's `id` query parameter).
    pub id: SpyId,
    /// Display name.
    pub name: SpyName,
    /// Display color.
    pub color: HexColor,
    /// Owning user. `None` only after the owner row was removed.
    pub user_id: Option<UserId>,
    /// When the spy was created.
    pub created_at: DateTime<Utc>,
    /// When the spy was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Requested changes to a spy. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpyChanges {
    pub name: Option<SpyName>,
    pub color: Option<HexColor>,
}

impl Spy {
    /// Apply `changes` in place.
    ///
    /// Returns `true` if any field actually changed. Colors that differ only
    /// in case or shorthand (`#ABC` vs `#aabbcc`) count as unchanged.
    pub fn apply(&mut self, changes: SpyChanges) -> bool {
        let mut changed = false;

        if let Some(name) = changes.name
            && name != self.name
        {
            self.name = name;
            changed = true;
        }

        if let Some(color) = changes.color
            && color.canonical() != self.color.canonical()
        {
            self.color = color;
            changed = true;
        }

        changed
    }
}
