//! Spy management route handlers. All require authentication.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use pixel_spy_core::SpyId;

use super::{ApiJson, parse_id};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Spy;
use crate::services::SpyService;
use crate::state::AppState;

/// Spy creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateSpyRequest {
    pub name: String,
    pub color: String,
}

/// Spy update request body. Omitted fields are kept.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSpyRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedSpy {
    pub spy_id: SpyId,
}

#[derive(Debug, Serialize)]
pub struct SpyList {
    pub spies: Vec<Spy>,
}

/// `POST /spy/new`
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    ApiJson(req): ApiJson<CreateSpyRequest>,
) -> Result<(StatusCode, Json<CreatedSpy>)> {
    let spy = SpyService::new(state.store())
        .create_spy(user_id, &req.name, &req.color)
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedSpy { spy_id: spy.id })))
}

/// `GET /spy/all`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<SpyList>> {
    let spies = SpyService::new(state.store()).list_spies(user_id).await?;
    Ok(Json(SpyList { spies }))
}

/// `GET /spy/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Spy>> {
    let id: SpyId = parse_id(&id)?;
    let spy = SpyService::new(state.store()).get_spy(id).await?;
    Ok(Json(spy))
}

/// `PUT /spy/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateSpyRequest>,
) -> Result<StatusCode> {
    let id: SpyId = parse_id(&id)?;
    SpyService::new(state.store())
        .update_spy(id, user_id, req.name.as_deref(), req.color.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /spy/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id: SpyId = parse_id(&id)?;
    SpyService::new(state.store()).delete_spy(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
