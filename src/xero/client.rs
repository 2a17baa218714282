//! Accounting API client.
//!
//! # Responsibilities
//! - Scope every call to one tenant via the `xero-tenant-id` header
//! - Map non-success statuses to `XeroError::Api` with the remote body
//! - Project the top-level collection out of each response

use std::time::{Duration, Instant};

use reqwest::{Client, ClientBuilder, Method};
use serde::Serialize;
use serde_json::Value;

use crate::config::TimeoutConfig;
use crate::observability::metrics;
use crate::xero::models::{NewContacts, NewInvoices};
use crate::xero::types::{XeroError, XeroResult};

/// Filter used to pick the income account for sample invoices.
pub const SALES_ACCOUNTS_FILTER: &str = r#"Status=="ACTIVE" AND Type=="SALES""#;

/// Build the pooled HTTP client shared by the identity and accounting clients.
pub fn create_http_client(timeouts: &TimeoutConfig) -> reqwest::Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeouts.upstream_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(format!("xero-oauth-bridge/{}", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Credentials for one tenant-scoped call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantAuth {
    pub access_token: String,
    pub tenant_id: String,
}

/// Thin wrapper over the Xero accounting endpoints.
#[derive(Clone)]
pub struct AccountingApi {
    base_url: String,
    http: Client,
}

impl AccountingApi {
    /// Create a client rooted at `base_url` (e.g. `https://api.xero.com/api.xro/2.0`).
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub async fn get_organisations(&self, auth: &TenantAuth) -> XeroResult<Value> {
        let body = self.send(auth, Method::GET, "Organisation", &[], None::<&()>).await?;
        project(body, "Organisations")
    }

    pub async fn get_contacts(&self, auth: &TenantAuth) -> XeroResult<Value> {
        let body = self.send(auth, Method::GET, "Contacts", &[], None::<&()>).await?;
        project(body, "Contacts")
    }

    /// Create contacts. Xero creates with PUT and updates with POST.
    pub async fn create_contacts(&self, auth: &TenantAuth, contacts: &NewContacts) -> XeroResult<Value> {
        let body = self.send(auth, Method::PUT, "Contacts", &[], Some(contacts)).await?;
        project(body, "Contacts")
    }

    pub async fn get_accounts(&self, auth: &TenantAuth, filter: Option<&str>) -> XeroResult<Value> {
        let query: Vec<(&str, &str)> = filter.map(|w| ("where", w)).into_iter().collect();
        let body = self.send(auth, Method::GET, "Accounts", &query, None::<&()>).await?;
        project(body, "Accounts")
    }

    pub async fn get_invoices(&self, auth: &TenantAuth) -> XeroResult<Value> {
        let body = self.send(auth, Method::GET, "Invoices", &[], None::<&()>).await?;
        project(body, "Invoices")
    }

    pub async fn create_invoices(&self, auth: &TenantAuth, invoices: &NewInvoices) -> XeroResult<Value> {
        let body = self.send(auth, Method::PUT, "Invoices", &[], Some(invoices)).await?;
        project(body, "Invoices")
    }

    pub async fn get_bank_transactions(&self, auth: &TenantAuth) -> XeroResult<Value> {
        let body = self.send(auth, Method::GET, "BankTransactions", &[], None::<&()>).await?;
        project(body, "BankTransactions")
    }

    /// Payments applied across invoices and credit notes.
    pub async fn get_payment_history(&self, auth: &TenantAuth) -> XeroResult<Value> {
        let body = self.send(auth, Method::GET, "Payments", &[], None::<&()>).await?;
        project(body, "Payments")
    }

    pub async fn get_reports_list(&self, auth: &TenantAuth) -> XeroResult<Value> {
        let body = self.send(auth, Method::GET, "Reports", &[], None::<&()>).await?;
        project(body, "Reports")
    }

    pub async fn get_report_ten_ninety_nine(&self, auth: &TenantAuth) -> XeroResult<Value> {
        let body = self.send(auth, Method::GET, "Reports/TenNinetyNine", &[], None::<&()>).await?;
        project(body, "Reports")
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        auth: &TenantAuth,
        method: Method,
        resource: &'static str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> XeroResult<Value> {
        let start = Instant::now();
        let url = format!("{}/{}", self.base_url, resource);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&auth.access_token)
            .header("xero-tenant-id", &auth.tenant_id)
            .header(reqwest::header::ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        metrics::record_upstream_call(resource, status.as_u16(), start);

        tracing::debug!(
            method = %method,
            resource = resource,
            tenant_id = %auth.tenant_id,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Accounting API call"
        );

        let text = response.text().await?;
        let parsed = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !status.is_success() {
            return Err(XeroError::Api {
                status: status.as_u16(),
                body: parsed,
            });
        }
        Ok(parsed)
    }
}

impl std::fmt::Debug for AccountingApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountingApi")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Take a top-level field out of a response body.
fn project(mut body: Value, field: &'static str) -> XeroResult<Value> {
    match body.get_mut(field) {
        Some(value) => Ok(value.take()),
        None => Err(XeroError::MissingField(field)),
    }
}

/// Read a string field from the first element of a projected collection.
pub fn first_id(collection: &Value, field: &str) -> Option<String> {
    collection
        .as_array()?
        .first()?
        .get(field)?
        .as_str()
        .map(str::to_string)
}
