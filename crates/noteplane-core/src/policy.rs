//! Authorization and quota decisions.
//!
//! Every function here is pure: it looks only at its arguments, performs
//! no I/O and keeps no state. Callers pass in a snapshot of the identity
//! and tenant contexts plus whatever resource counts the rule needs.
//!
//! A client-side allow is a UX hint, not a security guarantee; a
//! client-side deny prevents the call from being issued at all.

use crate::error::{
    AuthError, ForbiddenReason, NoteplaneError, PlanError, QuotaError, UpgradeRejection,
};
use crate::models::membership::Membership;
use crate::models::note::{Note, NoteDraft};
use crate::models::tenant::{Plan, Tenant, TenantId};
use crate::models::user::User;

/// Notes a non-admin member may own while the tenant is on the free plan.
pub const FREE_NOTE_LIMIT: u32 = 3;

/// Decide whether `actor` may create one more note.
///
/// Rules are evaluated in order, first match wins:
/// 1. admins are never quota-limited;
/// 2. a pro tenant lifts the cap for everyone;
/// 3. otherwise the member may own fewer than [`FREE_NOTE_LIMIT`] notes.
///
/// The member's own membership plan plays no part here; only the tenant
/// plan exempts from the quota.
pub fn can_create_note(
    actor: &User,
    tenant_plan: Plan,
    actor_note_count: usize,
) -> Result<(), QuotaError> {
    if actor.is_admin() {
        return Ok(());
    }
    if tenant_plan == Plan::Pro {
        return Ok(());
    }
    if actor_note_count < FREE_NOTE_LIMIT as usize {
        return Ok(());
    }
    Err(QuotaError::FreeLimitReached {
        limit: FREE_NOTE_LIMIT,
    })
}

/// Remaining creations before the quota bites, or `None` when unlimited.
pub fn remaining_quota(actor: &User, tenant_plan: Plan, actor_note_count: usize) -> Option<u32> {
    if actor.is_admin() || tenant_plan == Plan::Pro {
        return None;
    }
    let used = u32::try_from(actor_note_count).unwrap_or(u32::MAX);
    Some(FREE_NOTE_LIMIT.saturating_sub(used))
}

/// Admin of the same tenant as `target`.
pub fn can_change_member_plan(actor: &User, target: &Membership) -> Result<(), AuthError> {
    require_tenant_admin(actor, &target.tenant_id)
}

/// Admin of `tenant_id`.
pub fn can_invite(actor: &User, tenant_id: &TenantId) -> Result<(), AuthError> {
    require_tenant_admin(actor, tenant_id)
}

/// Admin-only views (member roster and count) of `tenant_id`.
pub fn can_view_members(actor: &User, tenant_id: &TenantId) -> Result<(), AuthError> {
    require_tenant_admin(actor, tenant_id)
}

/// Only an admin may upgrade, and only a free tenant can be upgraded.
pub fn can_upgrade_plan(actor: &User, tenant: &Tenant) -> Result<(), PlanError> {
    if tenant.is_pro() {
        return Err(PlanError::UpgradeRejected {
            reason: UpgradeRejection::AlreadyPro,
        });
    }
    if !actor.is_admin() || actor.tenant_id != tenant.id {
        return Err(PlanError::UpgradeRejected {
            reason: UpgradeRejection::NotAdmin,
        });
    }
    Ok(())
}

/// Update and delete stay inside the actor's tenant and belong to the
/// note's owner or an admin. Notes without a recorded owner are open to
/// the whole tenant.
pub fn can_modify_note(actor: &User, note: &Note) -> Result<(), AuthError> {
    if note
        .tenant_id
        .as_ref()
        .is_some_and(|tenant_id| *tenant_id != actor.tenant_id)
    {
        return Err(AuthError::forbidden(ForbiddenReason::CrossTenant));
    }
    match note.owner {
        Some(owner) if owner != actor.id && !actor.is_admin() => {
            Err(AuthError::forbidden(ForbiddenReason::NotOwner))
        }
        _ => Ok(()),
    }
}

/// Drafts must carry a non-blank title and target the actor's tenant.
pub fn validate_draft(actor: &User, draft: &NoteDraft) -> Result<(), NoteplaneError> {
    if draft.title.trim().is_empty() {
        return Err(NoteplaneError::validation("title is required"));
    }
    if draft.tenant_id != actor.tenant_id {
        return Err(AuthError::forbidden(ForbiddenReason::CrossTenant).into());
    }
    Ok(())
}

fn require_tenant_admin(actor: &User, tenant_id: &TenantId) -> Result<(), AuthError> {
    if !actor.is_admin() {
        return Err(AuthError::forbidden(ForbiddenReason::NotAdmin));
    }
    if actor.tenant_id != *tenant_id {
        return Err(AuthError::forbidden(ForbiddenReason::CrossTenant));
    }
    Ok(())
}

/// Flags the presentation layer renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub is_admin: bool,
    pub plan: Plan,
    pub can_add_note: bool,
    /// `None` when the actor is not quota-limited.
    pub quota_remaining: Option<u32>,
    /// Notes owned by the actor.
    pub note_count: usize,
    /// Only known to admins.
    pub member_count: Option<u64>,
}

impl ViewState {
    pub fn evaluate(
        actor: &User,
        tenant: &Tenant,
        actor_note_count: usize,
        member_count: Option<u64>,
    ) -> Self {
        Self {
            is_admin: actor.is_admin(),
            plan: tenant.plan,
            can_add_note: can_create_note(actor, tenant.plan, actor_note_count).is_ok(),
            quota_remaining: remaining_quota(actor, tenant.plan, actor_note_count),
            note_count: actor_note_count,
            member_count: if actor.is_admin() { member_count } else { None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::note::NoteId;
    use crate::models::user::{Role, UserId};

    fn user(id: i64, role: Role, tenant: &str) -> User {
        User {
            id: UserId(id),
            username: format!("user{id}"),
            name: String::new(),
            role,
            tenant_id: TenantId::from(tenant),
        }
    }

    fn membership(id: i64, tenant: &str, plan: Plan) -> Membership {
        Membership {
            user_id: UserId(id),
            tenant_id: TenantId::from(tenant),
            username: format!("user{id}"),
            name: String::new(),
            role: Role::Member,
            plan,
        }
    }

    fn note(owner: Option<i64>, tenant: Option<&str>) -> Note {
        Note {
            id: NoteId(1),
            title: "t".into(),
            content: String::new(),
            owner: owner.map(UserId),
            tenant_id: tenant.map(TenantId::from),
            created_at: None,
            updated_at: None,
            created_by: None,
        }
    }

    // -------------------------------------------------------------------
    // can_create_note
    // -------------------------------------------------------------------

    #[test]
    fn admins_are_never_quota_limited() {
        let admin = user(1, Role::Admin, "acme");
        for plan in [Plan::Free, Plan::Pro] {
            for count in [0, 2, 3, 5, 1_000] {
                assert!(can_create_note(&admin, plan, count).is_ok());
            }
        }
    }

    #[test]
    fn pro_tenant_lifts_member_cap() {
        let member = user(2, Role::Member, "globex");
        for count in [0, 3, 4, 250] {
            assert!(can_create_note(&member, Plan::Pro, count).is_ok());
        }
    }

    #[test]
    fn free_member_boundary_is_strict_less_than() {
        let member = user(2, Role::Member, "acme");
        assert!(can_create_note(&member, Plan::Free, 0).is_ok());
        assert!(can_create_note(&member, Plan::Free, 2).is_ok());
        assert_eq!(
            can_create_note(&member, Plan::Free, 3),
            Err(QuotaError::FreeLimitReached { limit: 3 })
        );
        assert_eq!(
            can_create_note(&member, Plan::Free, 9),
            Err(QuotaError::FreeLimitReached { limit: 3 })
        );
    }

    #[test]
    fn remaining_quota_counts_down_then_saturates() {
        let member = user(2, Role::Member, "acme");
        assert_eq!(remaining_quota(&member, Plan::Free, 0), Some(3));
        assert_eq!(remaining_quota(&member, Plan::Free, 2), Some(1));
        assert_eq!(remaining_quota(&member, Plan::Free, 7), Some(0));
        assert_eq!(remaining_quota(&member, Plan::Pro, 7), None);
        assert_eq!(remaining_quota(&user(1, Role::Admin, "acme"), Plan::Free, 7), None);
    }

    // -------------------------------------------------------------------
    // membership management
    // -------------------------------------------------------------------

    #[test]
    fn members_cannot_manage_memberships() {
        let member = user(2, Role::Member, "acme");
        for plan in [Plan::Free, Plan::Pro] {
            let err = can_change_member_plan(&member, &membership(3, "acme", plan)).unwrap_err();
            assert_eq!(err, AuthError::forbidden(ForbiddenReason::NotAdmin));
        }
        assert!(matches!(
            can_invite(&member, &TenantId::from("acme")),
            Err(AuthError::Forbidden { .. })
        ));
    }

    #[test]
    fn admin_cannot_reach_into_another_tenant() {
        let admin = user(1, Role::Admin, "acme");
        for plan in [Plan::Free, Plan::Pro] {
            let err = can_change_member_plan(&admin, &membership(9, "globex", plan)).unwrap_err();
            assert_eq!(err, AuthError::forbidden(ForbiddenReason::CrossTenant));
        }
        assert_eq!(
            can_invite(&admin, &TenantId::from("globex")),
            Err(AuthError::forbidden(ForbiddenReason::CrossTenant))
        );
        assert!(can_view_members(&admin, &TenantId::from("globex")).is_err());
    }

    #[test]
    fn admin_manages_own_tenant() {
        let admin = user(1, Role::Admin, "acme");
        assert!(can_change_member_plan(&admin, &membership(2, "acme", Plan::Free)).is_ok());
        assert!(can_invite(&admin, &TenantId::from("acme")).is_ok());
        assert!(can_view_members(&admin, &TenantId::from("acme")).is_ok());
    }

    // -------------------------------------------------------------------
    // plan upgrade
    // -------------------------------------------------------------------

    #[test]
    fn pro_tenant_upgrade_is_rejected() {
        let admin = user(1, Role::Admin, "globex");
        let tenant = Tenant::new("globex", "Globex Ltd", Plan::Pro);
        assert_eq!(
            can_upgrade_plan(&admin, &tenant),
            Err(PlanError::UpgradeRejected {
                reason: UpgradeRejection::AlreadyPro
            })
        );
    }

    #[test]
    fn only_admins_upgrade() {
        let tenant = Tenant::new("acme", "Acme Corp", Plan::Free);
        assert!(can_upgrade_plan(&user(1, Role::Admin, "acme"), &tenant).is_ok());
        assert_eq!(
            can_upgrade_plan(&user(2, Role::Member, "acme"), &tenant),
            Err(PlanError::UpgradeRejected {
                reason: UpgradeRejection::NotAdmin
            })
        );
    }

    // -------------------------------------------------------------------
    // note modification
    // -------------------------------------------------------------------

    #[test]
    fn owner_and_admin_may_modify() {
        let owner = user(2, Role::Member, "acme");
        let admin = user(1, Role::Admin, "acme");
        let n = note(Some(2), Some("acme"));
        assert!(can_modify_note(&owner, &n).is_ok());
        assert!(can_modify_note(&admin, &n).is_ok());
    }

    #[test]
    fn other_member_may_not_modify() {
        let other = user(3, Role::Member, "acme");
        assert_eq!(
            can_modify_note(&other, &note(Some(2), Some("acme"))),
            Err(AuthError::forbidden(ForbiddenReason::NotOwner))
        );
        assert!(can_modify_note(&other, &note(None, Some("acme"))).is_ok());
    }

    #[test]
    fn cross_tenant_note_is_forbidden_even_for_admin() {
        let admin = user(1, Role::Admin, "acme");
        assert_eq!(
            can_modify_note(&admin, &note(Some(1), Some("globex"))),
            Err(AuthError::forbidden(ForbiddenReason::CrossTenant))
        );
    }

    #[test]
    fn blank_title_is_rejected() {
        let member = user(2, Role::Member, "acme");
        let draft = NoteDraft {
            title: "   ".into(),
            content: "body".into(),
            tenant_id: TenantId::from("acme"),
            owner: UserId(2),
        };
        assert!(matches!(
            validate_draft(&member, &draft),
            Err(NoteplaneError::Validation { .. })
        ));
    }

    // -------------------------------------------------------------------
    // scenarios
    // -------------------------------------------------------------------

    #[test]
    fn scenario_admin_with_five_notes_on_free_tenant() {
        let admin = user(1, Role::Admin, "acme");
        assert!(can_create_note(&admin, Plan::Free, 5).is_ok());
    }

    #[test]
    fn scenario_member_blocked_then_unblocked_by_upgrade() {
        let member = user(2, Role::Member, "acme");
        let mut tenant = Tenant::new("acme", "Acme Corp", Plan::Free);

        assert_eq!(
            can_create_note(&member, tenant.plan, 3),
            Err(QuotaError::FreeLimitReached { limit: 3 })
        );

        tenant.mark_pro();
        assert!(can_create_note(&member, tenant.plan, 3).is_ok());
    }

    #[test]
    fn member_pro_plan_does_not_exempt_from_tenant_quota() {
        let member = user(2, Role::Member, "acme");
        let own = membership(2, "acme", Plan::Pro);
        assert_eq!(own.plan, Plan::Pro);
        assert!(can_create_note(&member, Plan::Free, 3).is_err());
    }

    #[test]
    fn view_state_hides_member_count_from_members() {
        let tenant = Tenant::new("acme", "Acme Corp", Plan::Free);
        let member_view = ViewState::evaluate(&user(2, Role::Member, "acme"), &tenant, 3, Some(4));
        assert!(!member_view.can_add_note);
        assert_eq!(member_view.quota_remaining, Some(0));
        assert_eq!(member_view.member_count, None);

        let admin_view = ViewState::evaluate(&user(1, Role::Admin, "acme"), &tenant, 3, Some(4));
        assert!(admin_view.can_add_note);
        assert_eq!(admin_view.member_count, Some(4));
    }
}
