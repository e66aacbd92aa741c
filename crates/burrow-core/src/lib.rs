//! # burrow-core
//!
//! Shared foundation for the Burrow maze server: the unified [`error::AppError`]
//! type, the [`result::AppResult`] alias, and the [`config::AppConfig`]
//! configuration schema loaded from TOML plus environment overrides.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
