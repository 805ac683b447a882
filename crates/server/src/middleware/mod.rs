//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction capture)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. CORS

pub mod auth;
pub mod client_ip;
pub mod cors;
pub mod request_id;

pub use auth::{RequireAuth, TOKEN_COOKIE, USER_COOKIE};
pub use client_ip::ClientIp;
pub use cors::cors_layer;
pub use request_id::request_id_middleware;
