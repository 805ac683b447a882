//! Public tracking pixel.

use axum::{
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};
use serde::Deserialize;

use pixel_spy_core::SpyId;

use super::{ApiQuery, parse_id};
use crate::error::{AppError, Result};
use crate::middleware::ClientIp;
use crate::services::{SpyError, SpyService};
use crate::state::AppState;

/// Image served for every successful visit.
pub const SPY_PNG: &[u8] = include_bytes!("../../static/spy.png");

#[derive(Debug, Deserialize)]
pub struct PixelQuery {
    pub id: Option<String>,
}

/// `GET /spy/pixel1?id=<spy id>`
///
/// Logs one record per fetch and returns the image. Unknown spies get a
/// `404` and no record.
pub async fn pixel(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ApiQuery(query): ApiQuery<PixelQuery>,
) -> Result<impl IntoResponse> {
    let raw = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("id query parameter is required".to_string()))?;
    let spy_id: SpyId = parse_id(&raw)?;

    SpyService::new(state.store())
        .record_visit(spy_id, &ip)
        .await
        .map_err(|e| match e {
            SpyError::Repository(err) => {
                tracing::error!(error = %err, spy_id = %spy_id, "Failed to record visit");
                AppError::Internal("failed to record visit".to_string())
            }
            other => AppError::Spy(other),
        })?;

    Ok((
        [(CONTENT_TYPE, "image/png"), (CACHE_CONTROL, "no-store")],
        SPY_PNG,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_is_png() {
        assert!(SPY_PNG.starts_with(b"\x89PNG\r\n\x1a\n"));
    }
}
