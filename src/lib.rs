//! Xero OAuth bridge library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod oauth;
pub mod observability;
pub mod session;
pub mod xero;

pub use config::schema::BridgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
