//! HTTP server for the children's reading app.
//!
//! - `GET /stories` lists every stored story
//! - `POST /stories` generates a story and returns it with its sight-word mappings
//! - `GET /` and `GET /script.js` serve the browser app

pub mod assets;
pub mod config;
pub mod routes;

pub use config::{ConfigError, ServerConfig};
pub use routes::{router, ApiError, AppState};
