//! Tenant domain model.
//!
//! Tenants provide full data isolation: every note and membership is
//! scoped to exactly one tenant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NoteplaneError;
use crate::models::user::Role;

/// Slug-style tenant identifier (e.g. `acme`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for TenantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Subscription plan, held both per tenant and per membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

impl Plan {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = NoteplaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            other => Err(NoteplaneError::validation(format!(
                "unknown plan `{other}`; expected free|pro"
            ))),
        }
    }
}

/// Snapshot of the current tenant.
///
/// Local operations only ever move `plan` from `free` to `pro`; see
/// [`Tenant::mark_pro`]. [`Tenant::apply_profile`] takes the server's word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    #[serde(default)]
    pub plan: Plan,
}

impl Tenant {
    pub fn new(id: impl Into<TenantId>, name: impl Into<String>, plan: Plan) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            plan,
        }
    }

    pub fn is_pro(&self) -> bool {
        self.plan == Plan::Pro
    }

    /// Apply a completed upgrade. There is no inverse.
    pub fn mark_pro(&mut self) {
        self.plan = Plan::Pro;
    }

    /// Overwrite the plan with the one the server reports.
    pub fn apply_profile(&mut self, profile: &TenantProfile) {
        if profile.tenant_id == self.id {
            self.plan = profile.plan;
        }
    }
}

/// Response body of `GET /tenants/me`: the caller and their tenant's
/// current plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantProfile {
    pub username: String,
    pub role: Role,
    pub tenant_id: TenantId,
    #[serde(default)]
    pub plan: Plan,
}

/// Response body of `POST /tenants/upgrade`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanUpgrade {
    pub plan: Plan,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_plan_defaults_to_free() {
        let tenant: Tenant = serde_json::from_str(r#"{"id":"acme","name":"Acme Corp"}"#).unwrap();
        assert_eq!(tenant.plan, Plan::Free);
        assert_eq!(tenant.id, TenantId::from("acme"));
    }

    #[test]
    fn mark_pro_is_idempotent() {
        let mut tenant = Tenant::new("acme", "Acme Corp", Plan::Free);
        tenant.mark_pro();
        tenant.mark_pro();
        assert!(tenant.is_pro());
    }

    #[test]
    fn profile_overrides_plan_for_the_same_tenant_only() {
        let mut tenant = Tenant::new("acme", "acme", Plan::Pro);
        let profile: TenantProfile = serde_json::from_str(
            r#"{"username":"acmeMember","role":"member","tenant_id":"acme","plan":"free"}"#,
        )
        .unwrap();
        tenant.apply_profile(&profile);
        assert_eq!(tenant.plan, Plan::Free);

        let mut other = Tenant::new("globex", "globex", Plan::Pro);
        other.apply_profile(&profile);
        assert!(other.is_pro());
    }

    #[test]
    fn plan_parses_known_values() {
        assert_eq!("PRO".parse::<Plan>().unwrap(), Plan::Pro);
        assert!("enterprise".parse::<Plan>().is_err());
    }
}
