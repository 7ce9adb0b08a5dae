//! Bearer token inspection.
//!
//! The client never holds the signing key, so claims are read without
//! signature verification. They only drive local UX decisions (is the
//! session still usable); the backend verifies every request.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use noteplane_core::models::session::BearerToken;
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Claims the backend embeds in its access tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (the username).
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Expiration (Unix timestamp).
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// `true` once `now + leeway` has reached `exp`. Tokens without an
    /// `exp` claim never expire locally. A leeway past the representable
    /// range saturates, so every token carrying `exp` counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_secs: u64) -> bool {
        let horizon = i64::try_from(leeway_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|leeway| now.checked_add_signed(leeway));
        self.expires_at()
            .is_some_and(|expires_at| horizon.is_none_or(|horizon| horizon >= expires_at))
    }
}

/// Read the claims of a JWT bearer token without verifying its signature.
pub fn inspect(token: &BearerToken) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<TokenClaims>(token.expose(), &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| TokenError::Malformed(e.to_string()))
}

/// Reject a token that is already expired (with leeway).
pub fn ensure_fresh(
    claims: &TokenClaims,
    now: DateTime<Utc>,
    leeway_secs: u64,
) -> Result<(), TokenError> {
    if claims.is_expired_at(now, leeway_secs) {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};

    fn sign(claims: &TokenClaims) -> BearerToken {
        let raw = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap();
        BearerToken::new(raw)
    }

    #[test]
    fn claims_are_readable_without_the_key() {
        let exp = Utc::now().timestamp() + 3600;
        let token = sign(&TokenClaims {
            sub: Some("acmeAdmin".into()),
            tenant_id: Some("acme".into()),
            role: Some("admin".into()),
            exp: Some(exp),
        });

        let claims = inspect(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("acmeAdmin"));
        assert_eq!(claims.tenant_id.as_deref(), Some("acme"));
        assert_eq!(claims.expires_at().unwrap().timestamp(), exp);
    }

    #[test]
    fn expired_token_is_detected_with_leeway() {
        let now = Utc::now();
        let claims = TokenClaims {
            exp: Some(now.timestamp() + 10),
            ..Default::default()
        };
        assert!(!claims.is_expired_at(now, 0));
        assert!(claims.is_expired_at(now, 30));
        assert!(matches!(
            ensure_fresh(&claims, now, 30),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn expired_token_still_inspects() {
        let token = sign(&TokenClaims {
            sub: Some("acmeMember".into()),
            exp: Some(1_000),
            ..Default::default()
        });
        let claims = inspect(&token).unwrap();
        assert!(claims.is_expired_at(Utc::now(), 0));
    }

    #[test]
    fn oversized_leeway_saturates() {
        let now = Utc::now();
        let claims = TokenClaims {
            exp: Some(now.timestamp() + 3600),
            ..Default::default()
        };
        assert!(claims.is_expired_at(now, u64::MAX));
        assert!(claims.is_expired_at(now, i64::MAX as u64));
        assert!(!TokenClaims::default().is_expired_at(now, u64::MAX));
    }

    #[test]
    fn missing_exp_never_expires() {
        let claims = TokenClaims::default();
        assert!(!claims.is_expired_at(Utc::now(), 30));
    }

    #[test]
    fn opaque_token_is_malformed() {
        let err = inspect(&BearerToken::new("not-a-jwt")).unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
    }
}
