//! HTTP surface of the bridge.
//!
//! # Data Flow
//! ```text
//! Browser request
//!     → server.rs (request ID, tracing, timeout, session middleware)
//!     → handlers.rs (OAuth flow or tenant-scoped Xero call)
//!     → response.rs (HTML failure page or JSON error body)
//!     → Browser
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use server::{build_router, AppState, HttpServer, ServerError};
