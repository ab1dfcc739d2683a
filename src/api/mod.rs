//! HTTP surface for the interaction service.
//!
//! One chat endpoint drives the whole workflow; a health endpoint
//! reports liveness. The router is composable — `api_router()` returns
//! a `Router` that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;
pub mod validate;

pub use router::api_router;
pub use server::{start_server, ServerHandle};
pub use types::AppContext;
