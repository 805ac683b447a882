//! Visit record route handlers. All require authentication.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use pixel_spy_core::{RecordId, SpyId};

use super::parse_id;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Record;
use crate::services::SpyService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecordList {
    pub records: Vec<Record>,
}

/// `GET /record/all`: records of every spy the caller owns.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<RecordList>> {
    let records = SpyService::new(state.store())
        .list_owner_records(user_id)
        .await?;
    Ok(Json(RecordList { records }))
}

/// `GET /record/spy/{id}`
pub async fn list_for_spy(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<RecordList>> {
    let spy_id: SpyId = parse_id(&id)?;
    let records = SpyService::new(state.store())
        .list_spy_records(spy_id)
        .await?;
    Ok(Json(RecordList { records }))
}

/// `DELETE /record/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id: RecordId = parse_id(&id)?;
    SpyService::new(state.store())
        .delete_record(id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
