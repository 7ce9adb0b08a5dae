//! Tenant context and the tenant/member operations that feed it.

use noteplane_auth::Session;
use noteplane_core::error::{
    NoteplaneError, NoteplaneResult, PlanError, TransportError, UpgradeRejection,
};
use noteplane_core::models::membership::{Invitation, Membership};
use noteplane_core::models::tenant::{Plan, Tenant};
use noteplane_core::models::user::{Role, UserId};
use noteplane_core::policy;
use noteplane_core::transport::{MemberApi, TenantApi};
use tracing::{debug, info, warn};

use crate::error::from_transport;

/// The current tenant, its roster, and its member count.
///
/// Roster and member count are only populated for admins.
#[derive(Debug, Default)]
pub struct TenantContext {
    tenant: Option<Tenant>,
    roster: Vec<Membership>,
    member_count: Option<u64>,
}

impl TenantContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held tenant snapshot. Roster and count belong to the
    /// previous tenant and are dropped.
    pub fn set_tenant(&mut self, tenant: Tenant) {
        self.tenant = Some(tenant);
        self.roster.clear();
        self.member_count = None;
    }

    pub fn tenant(&self) -> Option<&Tenant> {
        self.tenant.as_ref()
    }

    pub fn plan(&self) -> Option<Plan> {
        self.tenant.as_ref().map(|t| t.plan)
    }

    pub fn roster(&self) -> &[Membership] {
        &self.roster
    }

    pub fn member(&self, user_id: UserId) -> Option<&Membership> {
        self.roster.iter().find(|m| m.user_id == user_id)
    }

    pub fn member_count(&self) -> Option<u64> {
        self.member_count
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Tenant and member operations.
///
/// Each mutating method runs the matching policy check first; a denial
/// means no request is sent. None of them touch a [`TenantContext`] on
/// failure.
pub struct TenantService<A> {
    api: A,
}

impl<A: TenantApi + MemberApi> TenantService<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Pull the tenant's current plan from the server.
    ///
    /// Backends without a tenant endpoint answer 404 or 405; the snapshot
    /// taken at sign-in is then kept as is.
    pub async fn fetch_tenant(
        &self,
        session: &Session,
        ctx: &mut TenantContext,
    ) -> NoteplaneResult<()> {
        let profile = match self.api.current_tenant(&session.token).await {
            Ok(profile) => profile,
            Err(err) if matches!(err.status_code(), Some(404 | 405)) => {
                debug!(
                    operation = err.operation,
                    status = err.status_code(),
                    "Tenant endpoint unsupported, keeping sign-in snapshot"
                );
                return Ok(());
            }
            Err(err) => return Err(from_transport(err)),
        };

        match ctx.tenant.as_mut() {
            Some(tenant) => tenant.apply_profile(&profile),
            None => ctx.set_tenant(Tenant::new(
                profile.tenant_id.clone(),
                profile.tenant_id.to_string(),
                profile.plan,
            )),
        }
        Ok(())
    }

    /// Upgrade the actor's tenant to pro.
    pub async fn upgrade_plan(
        &self,
        session: &Session,
        ctx: &mut TenantContext,
    ) -> NoteplaneResult<Tenant> {
        let actor = &session.actor;
        let tenant = ctx.tenant.as_mut().ok_or_else(|| NoteplaneError::NotFound {
            entity: "tenant".into(),
            id: actor.tenant_id.to_string(),
        })?;

        if let Err(e) = policy::can_upgrade_plan(actor, tenant) {
            warn!(user_id = %actor.id, tenant_id = %tenant.id, error = %e, "Upgrade denied");
            return Err(e.into());
        }

        let upgrade = self
            .api
            .upgrade_plan(&session.token)
            .await
            .map_err(upgrade_rejection)?;

        if upgrade.plan == Plan::Pro {
            tenant.mark_pro();
        }
        info!(
            user_id = %actor.id,
            tenant_id = %tenant.id,
            message = upgrade.message.as_deref().unwrap_or_default(),
            "Tenant upgraded"
        );
        Ok(tenant.clone())
    }

    /// Set `target`'s membership plan.
    ///
    /// Returns the server's record, or `target` with the new plan when the
    /// server only acknowledges.
    pub async fn change_member_plan(
        &self,
        session: &Session,
        target: &Membership,
        new_plan: Plan,
    ) -> NoteplaneResult<Membership> {
        let actor = &session.actor;
        if let Err(e) = policy::can_change_member_plan(actor, target) {
            warn!(
                user_id = %actor.id,
                target_id = %target.user_id,
                error = %e,
                "Member plan change denied"
            );
            return Err(e.into());
        }

        let resp = self
            .api
            .change_member_plan(&session.token, target.user_id, new_plan)
            .await
            .map_err(from_transport)?;

        info!(
            user_id = %actor.id,
            target_id = %target.user_id,
            plan = %new_plan,
            "Member plan changed"
        );
        Ok(match resp.into_record() {
            Some(record) => record.into_membership(&target.tenant_id),
            None => Membership {
                plan: new_plan,
                ..target.clone()
            },
        })
    }

    /// Invite `email` into the actor's own tenant. `None` when the server
    /// only acknowledges the invitation.
    pub async fn invite_member(
        &self,
        session: &Session,
        email: &str,
        role: Role,
    ) -> NoteplaneResult<Option<Membership>> {
        let actor = &session.actor;
        if let Err(e) = policy::can_invite(actor, &actor.tenant_id) {
            warn!(user_id = %actor.id, error = %e, "Invitation denied");
            return Err(e.into());
        }

        let email = email.trim();
        if email.is_empty() {
            return Err(NoteplaneError::validation("email must not be empty"));
        }

        let invitation = Invitation {
            email: email.to_owned(),
            role,
            tenant_id: actor.tenant_id.clone(),
        };
        let resp = self
            .api
            .invite_member(&session.token, &invitation)
            .await
            .map_err(from_transport)?;

        info!(user_id = %actor.id, tenant_id = %actor.tenant_id, role = %role, "Member invited");
        Ok(resp
            .into_record()
            .map(|record| record.into_membership(&actor.tenant_id)))
    }

    /// Replace the roster with the server's list.
    pub async fn fetch_roster(
        &self,
        session: &Session,
        ctx: &mut TenantContext,
    ) -> NoteplaneResult<()> {
        let actor = &session.actor;
        policy::can_view_members(actor, &actor.tenant_id)?;

        let records = self
            .api
            .list_members(&session.token)
            .await
            .map_err(from_transport)?;
        ctx.roster = records
            .into_iter()
            .map(|r| r.into_membership(&actor.tenant_id))
            .collect();
        Ok(())
    }

    pub async fn fetch_member_count(
        &self,
        session: &Session,
        ctx: &mut TenantContext,
    ) -> NoteplaneResult<()> {
        let actor = &session.actor;
        policy::can_view_members(actor, &actor.tenant_id)?;

        let count = self
            .api
            .count_members(&session.token, &actor.tenant_id)
            .await
            .map_err(from_transport)?;
        ctx.member_count = Some(count.member_count);
        Ok(())
    }
}

/// Server-side refusals of an upgrade carry the server's explanation.
fn upgrade_rejection(err: TransportError) -> NoteplaneError {
    match err.status_code() {
        Some(status) if status != 401 && (400..500).contains(&status) => {
            let detail = err.detail().map_or_else(|| err.to_string(), str::to_owned);
            PlanError::UpgradeRejected {
                reason: UpgradeRejection::Backend(detail),
            }
            .into()
        }
        _ => from_transport(err),
    }
}
