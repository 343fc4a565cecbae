//! AudiCare API crate - the medicine label OCR proxy.
//!
//! A small axum server that accepts a base64 label photo from the app,
//! forwards it to the vision service with a server-held secret, and returns
//! the recognized text. Also exposes a health check.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
