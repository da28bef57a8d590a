//! keygate server: HTTP surface for the permission endpoints.

pub mod api_error;
pub mod config;
pub mod extract;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use routes::router;
pub use state::AppState;
