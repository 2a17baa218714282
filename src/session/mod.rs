//! Server-side session subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie: xero_session=<id>
//!     → middleware.rs (lookup, or create on miss)
//!     → Session handle in request extensions
//!     → handlers read / update SessionData
//!     → Set-Cookie on responses that created the session
//! ```
//!
//! # Design Decisions
//! - Sessions live only in process memory (DashMap)
//! - Idle expiry; a background sweeper drops stale records
//! - Every visitor gets a session, authenticated or not

pub mod cookie;
pub mod middleware;
pub mod store;
pub mod types;

pub use cookie::CookieSettings;
pub use middleware::{session_middleware, Session};
pub use store::SessionStore;
pub use types::{SessionData, SessionId};
