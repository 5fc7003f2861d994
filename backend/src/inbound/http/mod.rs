//! HTTP inbound adapter exposing REST endpoints.
//!
//! ```text
//! POST /cs/ask
//! GET  /cs/courses/{code}
//! GET  /health/ready
//! GET  /health/live
//! ```

pub mod ask;
pub mod courses;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;

pub use error::{ApiResult, json_config, path_config};
