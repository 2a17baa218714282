//! JWT claim decoding.
//!
//! Tokens arrive straight from the identity service over TLS, so claims are
//! read without signature verification.

use std::collections::HashSet;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;

use crate::oauth::types::{OAuthError, OAuthResult};

/// Decode the payload of a JWT into a JSON object.
pub fn decode_claims(token: &str) -> OAuthResult<Value> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    let claims = decode::<Value>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| OAuthError::InvalidToken(e.to_string()))?
        .claims;

    if !claims.is_object() {
        return Err(OAuthError::InvalidToken("payload is not a JSON object".into()));
    }
    Ok(claims)
}
