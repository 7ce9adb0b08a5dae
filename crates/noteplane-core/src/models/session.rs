//! Login wire records and the bearer credential.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::tenant::{Plan, Tenant, TenantId};
use crate::models::user::{Role, User, UserId};

/// Opaque bearer credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// The `user` object of a login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
    pub tenant_id: TenantId,
    /// The user's own membership plan; `null` or absent means free.
    #[serde(default)]
    pub plan: Option<Plan>,
}

impl AuthenticatedUser {
    pub fn plan(&self) -> Plan {
        self.plan.unwrap_or_default()
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            name: self.name.clone(),
            role: self.role,
            tenant_id: self.tenant_id.clone(),
        }
    }

    /// Initial tenant snapshot derived from the login response.
    ///
    /// The login payload carries no tenant name or tenant plan, so the id
    /// doubles as the name and the user's plan seeds the tenant plan until
    /// the tenant profile is fetched.
    pub fn initial_tenant(&self) -> Tenant {
        Tenant {
            id: self.tenant_id.clone(),
            name: self.tenant_id.to_string(),
            plan: self.plan(),
        }
    }
}

/// Response body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: BearerToken,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: AuthenticatedUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_decodes_backend_payload() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{
                "access_token": "abc.def.ghi",
                "token_type": "bearer",
                "user": {
                    "id": 1,
                    "username": "acmeAdmin",
                    "role": "admin",
                    "tenant_id": "acme",
                    "name": "",
                    "plan": null
                }
            }"#,
        )
        .unwrap();
        assert_eq!(resp.user.plan(), Plan::Free);
        assert_eq!(resp.user.to_user().username, "acmeAdmin");

        let resp: LoginResponse = serde_json::from_str(
            r#"{"access_token":"abc","user":{"id":1,"role":"admin","tenant_id":"acme"}}"#,
        )
        .unwrap();
        assert_eq!(resp.user.plan(), Plan::Free);
        assert_eq!(resp.access_token.header_value(), "Bearer abc");

        let tenant = resp.user.initial_tenant();
        assert_eq!(tenant.name, "acme");
        assert_eq!(tenant.plan, Plan::Free);
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = BearerToken::new("secret-token");
        assert!(!format!("{token:?}").contains("secret"));
    }
}
