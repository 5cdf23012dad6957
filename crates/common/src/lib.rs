pub mod config;
pub mod errors;
pub mod format;
pub mod logging;
pub mod timing;

pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
