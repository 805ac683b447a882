//! Visit record domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pixel_spy_core::{RecordId, SpyId};

/// One logged pixel fetch.
///
/// Records carry no owner of their own; whoever owns `spy_id` owns the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Unique record ID.
    pub id: RecordId,
    /// Source IP of the fetch.
    pub ip: String,
    /// When the fetch happened.
    pub time: DateTime<Utc>,
    /// Spy the fetch was for. `None` once the spy row was physically removed.
    pub spy_id: Option<SpyId>,
    /// When the record was written.
    pub created_at: DateTime<Utc>,
}
