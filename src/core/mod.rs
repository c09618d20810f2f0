//! Core types shared by every layer of cms-content.
//!
//! Currently this is the error taxonomy:
//! - [`ContentError`] - enumerated failures that can escape the library
//! - [`ErrorContext`] - user-facing wrapper with suggestions and details
//! - [`user_friendly_error`] - convert any `anyhow::Error` for CLI display

pub mod error;

pub use error::{ContentError, ErrorContext, user_friendly_error};
