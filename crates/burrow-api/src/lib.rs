//! # burrow-api
//!
//! The HTTP layer: axum router assembly, the route binder, the
//! session-scoped dispatch wrapper, the core maze handlers, and the
//! `AppError` to HTTP status mapping.

pub mod binder;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
