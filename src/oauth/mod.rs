//! Xero OAuth2 (authorization-code) subsystem.
//!
//! # Data Flow
//! ```text
//! GET /connect
//!     → client.rs consent_url(state) → 303 to Xero login
//! GET /callback?code&state
//!     → client.rs exchange_code → TokenSet
//!     → client.rs fetch_tenants → Vec<Tenant> (most recent first)
//!     → token.rs decode_claims(id_token, access_token)
//!     → AuthorizedSession stored in the server-side session
//! ```

pub mod client;
pub mod token;
pub mod types;

pub use client::XeroOAuthClient;
pub use token::decode_claims;
pub use types::{AuthorizedSession, CallbackParams, OAuthError, OAuthResult, Tenant, TokenSet};
