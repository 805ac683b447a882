//! Pixel Spy Core - Shared domain types.
//!
//! This crate provides the validated types used across Pixel Spy components:
//! - `server` - HTTP API and tracking-pixel endpoint
//! - `cli` - Command-line tools for migrations and user bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP. Anything that reaches the store has already been parsed
//! into one of these types.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, spy names and hex colors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
