//! Session record and identifier types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::oauth::{AuthorizedSession, Tenant, TokenSet};
use crate::xero::{TenantAuth, XeroError, XeroResult};

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the bridge remembers about one browser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// CSRF `state` issued by `/connect`, consumed by `/callback`.
    pub oauth_state: Option<String>,
    pub decoded_id_token: Option<Value>,
    pub decoded_access_token: Option<Value>,
    pub token_set: Option<TokenSet>,
    pub all_tenants: Vec<Tenant>,
    pub active_tenant: Option<Tenant>,
}

impl SessionData {
    /// Whether the OAuth flow has completed for this session.
    pub fn is_authenticated(&self) -> bool {
        self.token_set.is_some()
    }

    /// Record a completed authorization. Tenant 0 becomes the active tenant.
    pub fn apply_authorization(&mut self, auth: AuthorizedSession) {
        self.active_tenant = auth.tenants.first().cloned();
        self.all_tenants = auth.tenants;
        self.token_set = Some(auth.token_set);
        self.decoded_id_token = Some(auth.decoded_id_token);
        self.decoded_access_token = Some(auth.decoded_access_token);
        self.oauth_state = None;
    }

    /// Credentials for a call scoped to the active tenant.
    pub fn tenant_auth(&self) -> XeroResult<TenantAuth> {
        let token_set = self.token_set.as_ref().ok_or(XeroError::NotAuthenticated)?;
        let tenant = self.active_tenant.as_ref().ok_or(XeroError::NoActiveTenant)?;
        Ok(TenantAuth {
            access_token: token_set.access_token.clone(),
            tenant_id: tenant.tenant_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tenant(id: &str) -> Tenant {
        Tenant {
            id: format!("conn-{}", id),
            tenant_id: id.into(),
            tenant_type: "ORGANISATION".into(),
            tenant_name: None,
            created_date_utc: None,
            updated_date_utc: None,
            extra: Default::default(),
        }
    }

    fn authorized() -> AuthorizedSession {
        AuthorizedSession {
            token_set: TokenSet {
                access_token: "access".into(),
                refresh_token: Some("refresh".into()),
                id_token: Some("id".into()),
                token_type: "Bearer".into(),
                scope: None,
                expires_at: None,
            },
            decoded_id_token: json!({"email": "a@b.c"}),
            decoded_access_token: json!({"xero_userid": "u"}),
            tenants: vec![tenant("first"), tenant("second")],
        }
    }

    #[test]
    fn test_unauthenticated() {
        let data = SessionData::default();
        assert!(!data.is_authenticated());
        assert!(matches!(data.tenant_auth(), Err(XeroError::NotAuthenticated)));
    }

    #[test]
    fn test_apply_authorization_selects_first_tenant() {
        let mut data = SessionData {
            oauth_state: Some("s".into()),
            ..Default::default()
        };
        data.apply_authorization(authorized());

        assert!(data.is_authenticated());
        assert!(data.oauth_state.is_none());
        assert_eq!(data.all_tenants.len(), 2);
        assert_eq!(data.active_tenant.as_ref(), data.all_tenants.first());

        let auth = data.tenant_auth().unwrap();
        assert_eq!(auth.tenant_id, "first");
        assert_eq!(auth.access_token, "access");
    }

    #[test]
    fn test_no_active_tenant() {
        let mut data = SessionData::default();
        data.apply_authorization(AuthorizedSession {
            tenants: vec![],
            ..authorized()
        });
        assert!(matches!(data.tenant_auth(), Err(XeroError::NoActiveTenant)));
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }
}
