//! Membership domain model.
//!
//! A membership's plan is independent of its tenant's plan: a free tenant
//! may contain members individually marked `pro`.

use serde::{Deserialize, Serialize};

use crate::models::tenant::{Plan, TenantId};
use crate::models::user::{Role, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub plan: Plan,
}

/// Membership as returned by the member endpoints.
///
/// The backend omits `tenant_id` (it only ever lists the caller's tenant)
/// and `role` (it only lists members), so both are optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    #[serde(default)]
    pub plan: Plan,
}

impl MemberRecord {
    /// Attribute the record to `tenant_id` unless the backend named one.
    pub fn into_membership(self, tenant_id: &TenantId) -> Membership {
        Membership {
            user_id: self.id,
            tenant_id: self.tenant_id.unwrap_or_else(|| tenant_id.clone()),
            username: self.username,
            name: self.name,
            role: self.role.unwrap_or(Role::Member),
            plan: self.plan,
        }
    }
}

impl From<Membership> for MemberRecord {
    fn from(m: Membership) -> Self {
        Self {
            id: m.user_id,
            username: m.username,
            name: m.name,
            role: Some(m.role),
            tenant_id: Some(m.tenant_id),
            plan: m.plan,
        }
    }
}

/// Response of the change-plan and invite endpoints.
///
/// Some backends echo the affected membership, others only acknowledge
/// with `{"message": ...}`. Either way the roster refetch that follows is
/// the canonical source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberResponse {
    Record(MemberRecord),
    Ack {
        #[serde(default)]
        message: Option<String>,
    },
}

impl MemberResponse {
    pub fn into_record(self) -> Option<MemberRecord> {
        match self {
            Self::Record(record) => Some(record),
            Self::Ack { .. } => None,
        }
    }
}

/// Body of `POST /users/invite`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub email: String,
    pub role: Role,
    pub tenant_id: TenantId,
}

/// Body of `POST /users/change-plan/{user_id}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlanChange {
    pub new_plan: Plan,
}

/// Response body of `GET /users/count-members`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MemberCount {
    pub member_count: u64,
}
