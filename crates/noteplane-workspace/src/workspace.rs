//! The `Workspace` facade: one signed-in actor's view of their tenant.

use noteplane_auth::{AuthConfig, AuthService, IdentityContext, Session};
use noteplane_core::error::{NoteplaneError, NoteplaneResult};
use noteplane_core::models::membership::Membership;
use noteplane_core::models::note::{DeleteOutcome, Note, NoteAck, NoteId};
use noteplane_core::models::tenant::{Plan, Tenant};
use noteplane_core::models::user::{Credential, Role, User, UserId};
use noteplane_core::policy::{self, ViewState};
use noteplane_core::transport::Backend;
use tracing::{debug, warn};

use crate::notes::{NoteBoard, NoteService};
use crate::refresh::{Mutation, Stale};
use crate::tenant::{TenantContext, TenantService};

/// Owns the identity context, tenant context and note board, and runs
/// every mutation through mutate → invalidate → refetch.
///
/// All mutating methods take `&mut self`, so at most one mutation is in
/// flight per workspace.
pub struct Workspace<B: Backend> {
    auth: AuthService<B>,
    tenants: TenantService<B>,
    notes: NoteService<B>,
    identity: IdentityContext,
    tenant: TenantContext,
    board: NoteBoard,
    stale: Stale,
}

impl<B: Backend + Clone> Workspace<B> {
    pub fn new(backend: B, config: AuthConfig) -> Self {
        Self {
            auth: AuthService::new(backend.clone(), config),
            tenants: TenantService::new(backend.clone()),
            notes: NoteService::new(backend),
            identity: IdentityContext::new(),
            tenant: TenantContext::new(),
            board: NoteBoard::new(),
            stale: Stale::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Sign in and load the tenant, notes and (for admins) the roster.
    ///
    /// A rejected login leaves the previous session and its data in place.
    /// Once the credential is accepted the call succeeds: aggregates whose
    /// first fetch failed stay flagged in [`Workspace::stale`] until the
    /// next [`Workspace::refresh`].
    pub async fn login(&mut self, credential: Credential) -> NoteplaneResult<User> {
        let output = self.auth.login(&mut self.identity, credential).await?;
        self.tenant.set_tenant(output.tenant);
        self.board.clear();
        self.stale = Stale::default();

        if let Err(err) = self.settle(Mutation::SignIn).await {
            warn!(
                user_id = %output.session.actor.id,
                stale = ?self.stale,
                error = %err,
                "Signed in with stale data"
            );
        }
        Ok(output.session.actor)
    }

    /// Sign out and forget everything fetched for the session.
    pub fn logout(&mut self) {
        self.auth.logout(&mut self.identity);
        self.tenant.clear();
        self.board.clear();
        self.stale = Stale::default();
    }

    pub fn current_actor(&self) -> Option<&User> {
        self.identity.current_actor()
    }

    pub fn session(&self) -> Option<&Session> {
        self.identity.session()
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    pub fn tenant(&self) -> Option<&Tenant> {
        self.tenant.tenant()
    }

    pub fn notes(&self) -> &[Note] {
        self.board.notes()
    }

    pub fn roster(&self) -> &[Membership] {
        self.tenant.roster()
    }

    /// The held roster, for actors allowed to see it.
    pub fn members(&self) -> NoteplaneResult<&[Membership]> {
        let session = self.auth.authorize(&self.identity)?;
        let actor = &session.actor;
        policy::can_view_members(actor, &actor.tenant_id)?;
        Ok(self.tenant.roster())
    }

    pub fn member_count(&self) -> Option<u64> {
        self.tenant.member_count()
    }

    /// Aggregates still waiting for a successful refetch.
    pub fn stale(&self) -> Stale {
        self.stale
    }

    /// Decision flags for the current actor, evaluated on held state.
    pub fn view_state(&self) -> NoteplaneResult<ViewState> {
        let session = self.auth.authorize(&self.identity)?;
        let actor = &session.actor;
        let tenant = self.tenant.tenant().ok_or_else(|| missing_tenant(actor))?;

        Ok(ViewState::evaluate(
            actor,
            tenant,
            self.board.count_owned_by(actor.id),
            self.tenant.member_count(),
        ))
    }

    /// Refetch every aggregate.
    pub async fn refresh(&mut self) -> NoteplaneResult<()> {
        self.stale = Stale::all();
        self.sync().await
    }

    // -----------------------------------------------------------------------
    // Notes
    // -----------------------------------------------------------------------

    pub async fn create_note(&mut self, title: &str, content: &str) -> NoteplaneResult<NoteAck> {
        let session = self.auth.authorize(&self.identity)?;
        let plan = self
            .tenant
            .plan()
            .ok_or_else(|| missing_tenant(&session.actor))?;
        let ack = self
            .notes
            .create(session, plan, &self.board, title, content)
            .await?;

        self.settle(Mutation::CreateNote).await?;
        Ok(ack)
    }

    pub async fn update_note(
        &mut self,
        id: NoteId,
        title: &str,
        content: &str,
    ) -> NoteplaneResult<NoteAck> {
        let session = self.auth.authorize(&self.identity)?;
        let ack = self
            .notes
            .update(session, &self.board, id, title, content)
            .await?;

        self.settle(Mutation::UpdateNote).await?;
        Ok(ack)
    }

    pub async fn delete_note(&mut self, id: NoteId) -> NoteplaneResult<DeleteOutcome> {
        let session = self.auth.authorize(&self.identity)?;
        let outcome = self.notes.delete(session, &self.board, id).await?;

        self.settle(Mutation::DeleteNote).await?;
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Tenant and members
    // -----------------------------------------------------------------------

    pub async fn upgrade_plan(&mut self) -> NoteplaneResult<Tenant> {
        let session = self.auth.authorize(&self.identity)?;
        let tenant = self.tenants.upgrade_plan(session, &mut self.tenant).await?;

        self.settle(Mutation::UpgradePlan).await?;
        Ok(tenant)
    }

    pub async fn change_member_plan(
        &mut self,
        target: &Membership,
        new_plan: Plan,
    ) -> NoteplaneResult<Membership> {
        let session = self.auth.authorize(&self.identity)?;
        let membership = self
            .tenants
            .change_member_plan(session, target, new_plan)
            .await?;

        self.settle(Mutation::ChangeMemberPlan).await?;
        Ok(self
            .tenant
            .member(target.user_id)
            .cloned()
            .unwrap_or(membership))
    }

    /// [`Workspace::change_member_plan`] for a member of the held roster.
    pub async fn change_member_plan_by_id(
        &mut self,
        user_id: UserId,
        new_plan: Plan,
    ) -> NoteplaneResult<Membership> {
        let target = self
            .tenant
            .member(user_id)
            .cloned()
            .ok_or_else(|| NoteplaneError::NotFound {
                entity: "member".into(),
                id: user_id.to_string(),
            })?;
        self.change_member_plan(&target, new_plan).await
    }

    /// Invite `email` into the actor's tenant. The invitee is looked up in
    /// the refetched roster, so `None` means the server neither echoed the
    /// membership nor lists it (invited admins are never listed).
    pub async fn invite_member(
        &mut self,
        email: &str,
        role: Role,
    ) -> NoteplaneResult<Option<Membership>> {
        let session = self.auth.authorize(&self.identity)?;
        let echoed = self.tenants.invite_member(session, email, role).await?;

        self.settle(Mutation::InviteMember).await?;
        let email = email.trim();
        Ok(self
            .tenant
            .roster()
            .iter()
            .find(|m| m.username == email)
            .cloned()
            .or(echoed))
    }

    // -----------------------------------------------------------------------
    // Refresh pipeline
    // -----------------------------------------------------------------------

    async fn settle(&mut self, mutation: Mutation) -> NoteplaneResult<()> {
        let stale = mutation.invalidates();
        debug!(mutation = mutation.as_str(), ?stale, "Invalidating");
        self.stale.merge(stale);
        self.sync().await
    }

    /// Refetch whatever is stale. Every stale aggregate is attempted; the
    /// first failure is returned and its flag stays set.
    async fn sync(&mut self) -> NoteplaneResult<()> {
        let session = self.auth.authorize(&self.identity)?;
        let mut first_error = None;

        if self.stale.tenant {
            let result = self.tenants.fetch_tenant(session, &mut self.tenant).await;
            settle_flag(&mut self.stale.tenant, "tenant", result, &mut first_error);
        }
        if self.stale.notes {
            let result = self.notes.fetch(session, &mut self.board).await;
            settle_flag(&mut self.stale.notes, "notes", result, &mut first_error);
        }

        if session.actor.is_admin() {
            if self.stale.roster {
                let result = self.tenants.fetch_roster(session, &mut self.tenant).await;
                settle_flag(&mut self.stale.roster, "roster", result, &mut first_error);
            }
            if self.stale.member_count {
                let result = self
                    .tenants
                    .fetch_member_count(session, &mut self.tenant)
                    .await;
                settle_flag(
                    &mut self.stale.member_count,
                    "member count",
                    result,
                    &mut first_error,
                );
            }
        } else {
            // Members never see the roster.
            self.stale.roster = false;
            self.stale.member_count = false;
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn settle_flag(
    flag: &mut bool,
    aggregate: &'static str,
    result: NoteplaneResult<()>,
    first_error: &mut Option<NoteplaneError>,
) {
    match result {
        Ok(()) => *flag = false,
        Err(err) => {
            warn!(aggregate, error = %err, "Refetch failed");
            first_error.get_or_insert(err);
        }
    }
}

fn missing_tenant(actor: &User) -> NoteplaneError {
    NoteplaneError::NotFound {
        entity: "tenant".into(),
        id: actor.tenant_id.to_string(),
    }
}
