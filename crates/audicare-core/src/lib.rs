pub mod config;
pub mod error;

pub use config::AudiCareConfig;
pub use error::{AudiCareError, Result};

/// Product name shown in banners and the assistant greeting.
pub const APP_NAME: &str = "AudiCare";
