//! Visitor IP extractor for the pixel route.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

use crate::state::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Fallback when neither the socket nor a trusted proxy header gives an address.
pub const UNKNOWN_IP: &str = "unknown";

/// The caller's IP address as text.
///
/// Taken from the socket peer. When `TRUST_PROXY` is enabled, the first
/// `X-Forwarded-For` entry wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve(parts, state.config().trust_proxy)))
    }
}

fn resolve(parts: &Parts, trust_proxy: bool) -> String {
    if trust_proxy && let Some(ip) = forwarded_for(parts) {
        return ip;
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| UNKNOWN_IP.to_string(), |info| info.0.ip().to_string())
}

fn forwarded_for(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(FORWARDED_FOR)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
}
