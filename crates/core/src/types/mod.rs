//! Core types for Pixel Spy.
//!
//! This module provides type-safe wrappers for the domain's input fields.

pub mod color;
pub mod email;
pub mod id;
pub mod spy_name;

pub use color::{HexColor, HexColorError};
pub use email::{Email, EmailError};
pub use id::*;
pub use spy_name::{SpyName, SpyNameError};
