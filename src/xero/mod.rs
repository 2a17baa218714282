//! Xero accounting API subsystem.
//!
//! # Data Flow
//! ```text
//! route handler
//!     → TenantAuth { access_token, tenant_id } from the session
//!     → client.rs (one HTTP call, tenant header attached)
//!     → types.rs (non-2xx → XeroError::Api with remote body)
//!     → projected collection (Contacts, Invoices, ...) as JSON
//! ```
//!
//! # Design Decisions
//! - Resource bodies are opaque `serde_json::Value`s
//! - Only creation payloads are typed (models.rs)
//! - No retries: a failed call is reported to the caller as-is

pub mod client;
pub mod models;
pub mod types;

pub use client::{create_http_client, first_id, AccountingApi, TenantAuth, SALES_ACCOUNTS_FILTER};
pub use types::{XeroError, XeroResult};
