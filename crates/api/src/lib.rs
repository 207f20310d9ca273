//! HTTP surface for the job engine: the lifecycle protocol routes, the SSE
//! event stream, configuration, and application wiring.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod sse;
pub mod state;

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use router::router;
pub use state::{build_state, AppState};
