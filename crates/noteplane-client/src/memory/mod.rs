//! In-process implementation of the transport traits.
//!
//! Behaves like the notes backend: it issues HS256 access tokens, answers
//! with HTTP-like statuses, and enforces the same authorization and quota
//! rules server-side using [`noteplane_core::policy`]. Used by the test
//! suites and by the CLI's `--memory` mode.

mod seed;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use noteplane_core::error::{NoteplaneError, TransportError};
use noteplane_core::models::membership::{
    Invitation, MemberCount, MemberRecord, MemberResponse, Membership,
};
use noteplane_core::models::note::{DeleteOutcome, Note, NoteAck, NoteDraft, NoteId};
use noteplane_core::models::session::{AuthenticatedUser, BearerToken, LoginResponse};
use noteplane_core::models::tenant::{Plan, PlanUpgrade, Tenant, TenantId, TenantProfile};
use noteplane_core::models::user::{Credential, Role, User, UserId};
use noteplane_core::policy;
use noteplane_core::transport::{AuthApi, MemberApi, NotesApi, TenantApi, TransportResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use seed::DEMO_PASSWORD;

const TOKEN_SECRET: &[u8] = b"noteplane-memory-backend";
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    tenant_id: String,
    role: Role,
    exp: i64,
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    /// `None` for invited users who have not set a password yet.
    password: Option<String>,
    plan: Plan,
}

impl StoredUser {
    fn membership(&self) -> Membership {
        Membership {
            user_id: self.user.id,
            tenant_id: self.user.tenant_id.clone(),
            username: self.user.username.clone(),
            name: self.user.name.clone(),
            role: self.user.role,
            plan: self.plan,
        }
    }
}

#[derive(Debug)]
struct State {
    tenants: BTreeMap<TenantId, Tenant>,
    users: BTreeMap<UserId, StoredUser>,
    notes: BTreeMap<NoteId, Note>,
    next_user_id: i64,
    next_note_id: i64,
    token_lifetime_secs: i64,
    /// Pending injected failures, consumed first-match by operation.
    injected: Vec<(&'static str, u16)>,
    calls: Vec<&'static str>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            tenants: BTreeMap::new(),
            users: BTreeMap::new(),
            notes: BTreeMap::new(),
            next_user_id: 1,
            next_note_id: 1,
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
            injected: Vec::new(),
            calls: Vec::new(),
        }
    }
}

impl State {
    /// Log the call and fire an injected failure if one is pending.
    fn record(&mut self, operation: &'static str) -> TransportResult<()> {
        self.calls.push(operation);
        if let Some(pos) = self.injected.iter().position(|(op, _)| *op == operation) {
            let (_, status) = self.injected.remove(pos);
            return Err(TransportError::status(
                operation,
                status,
                Some("injected failure".into()),
            ));
        }
        Ok(())
    }

    fn authenticate(&self, operation: &'static str, token: &BearerToken) -> TransportResult<User> {
        let unauthorized = || TransportError::status(operation, 401, Some("Invalid token".into()));

        let claims = jsonwebtoken::decode::<Claims>(
            token.expose(),
            &DecodingKey::from_secret(TOKEN_SECRET),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| unauthorized())?
        .claims;

        self.users
            .values()
            .find(|u| u.user.username == claims.sub)
            .map(|u| u.user.clone())
            .ok_or_else(unauthorized)
    }

    fn tenant_plan(&self, operation: &'static str, tenant_id: &TenantId) -> TransportResult<Plan> {
        self.tenants
            .get(tenant_id)
            .map(|t| t.plan)
            .ok_or_else(|| TransportError::status(operation, 404, Some("Tenant not found".into())))
    }
}

fn forbidden(operation: &'static str, reason: impl ToString) -> TransportError {
    TransportError::status(operation, 403, Some(reason.to_string()))
}

fn rejected(operation: &'static str, err: NoteplaneError) -> TransportError {
    match err {
        NoteplaneError::Validation { message } => {
            TransportError::status(operation, 422, Some(message))
        }
        other => forbidden(operation, other),
    }
}

/// In-process backend. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    /// An empty backend with no tenants or users.
    pub fn new() -> Self {
        Self::default()
    }

    /// The demo tenants and users (see [`DEMO_PASSWORD`]).
    pub fn seeded() -> Self {
        let backend = Self::new();
        for tenant in seed::tenants() {
            backend.add_tenant(tenant);
        }
        for user in seed::USERS {
            backend.add_user(
                user.username,
                DEMO_PASSWORD,
                user.role,
                TenantId::from(user.tenant),
                Plan::Free,
            );
        }
        backend
    }

    /// Lifetime of newly issued tokens. Negative values issue tokens that
    /// are already expired.
    pub fn with_token_lifetime(self, secs: i64) -> Self {
        self.state.lock().token_lifetime_secs = secs;
        self
    }

    pub fn add_tenant(&self, tenant: Tenant) {
        self.state.lock().tenants.insert(tenant.id.clone(), tenant);
    }

    pub fn add_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        tenant_id: TenantId,
        plan: Plan,
    ) -> UserId {
        let mut state = self.state.lock();
        let id = UserId(state.next_user_id);
        state.next_user_id += 1;
        state.users.insert(
            id,
            StoredUser {
                user: User {
                    id,
                    username: username.to_owned(),
                    name: String::new(),
                    role,
                    tenant_id,
                },
                password: Some(password.to_owned()),
                plan,
            },
        );
        id
    }

    /// Make the next call to `operation` fail with `status`.
    pub fn fail_next(&self, operation: &'static str, status: u16) {
        self.state.lock().injected.push((operation, status));
    }

    /// Operation names received so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|op| **op == operation)
            .count()
    }

    pub fn tenant(&self, id: &TenantId) -> Option<Tenant> {
        self.state.lock().tenants.get(id).cloned()
    }

    pub fn membership(&self, user_id: UserId) -> Option<Membership> {
        self.state.lock().users.get(&user_id).map(StoredUser::membership)
    }

    pub fn user_id(&self, username: &str) -> Option<UserId> {
        self.state
            .lock()
            .users
            .values()
            .find(|u| u.user.username == username)
            .map(|u| u.user.id)
    }

    pub fn notes_of(&self, tenant_id: &TenantId) -> Vec<Note> {
        self.state
            .lock()
            .notes
            .values()
            .filter(|n| n.tenant_id.as_ref() == Some(tenant_id))
            .cloned()
            .collect()
    }

    fn issue_token(&self, user: &User, lifetime_secs: i64) -> TransportResult<BearerToken> {
        let claims = Claims {
            sub: user.username.clone(),
            tenant_id: user.tenant_id.to_string(),
            role: user.role,
            exp: Utc::now().timestamp() + lifetime_secs,
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TOKEN_SECRET),
        )
        .map(BearerToken::new)
        .map_err(|e| TransportError::status("login", 500, Some(e.to_string())))
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

impl AuthApi for MemoryBackend {
    async fn login(&self, credential: &Credential) -> TransportResult<LoginResponse> {
        let (stored, lifetime) = {
            let mut state = self.state.lock();
            state.record("login")?;
            let stored = state
                .users
                .values()
                .find(|u| {
                    u.user.username == credential.username
                        && u.password.as_deref() == Some(credential.password.as_str())
                })
                .cloned()
                .ok_or_else(|| {
                    TransportError::status("login", 401, Some("Invalid credentials".into()))
                })?;
            (stored, state.token_lifetime_secs)
        };

        let access_token = self.issue_token(&stored.user, lifetime)?;
        debug!(username = %stored.user.username, "Issued access token");

        Ok(LoginResponse {
            access_token,
            token_type: Some("bearer".into()),
            user: AuthenticatedUser {
                id: stored.user.id,
                username: stored.user.username,
                name: stored.user.name,
                role: stored.user.role,
                tenant_id: stored.user.tenant_id,
                plan: Some(stored.plan),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

impl NotesApi for MemoryBackend {
    async fn list_notes(
        &self,
        token: &BearerToken,
        tenant_id: &TenantId,
    ) -> TransportResult<Vec<Note>> {
        const OP: &str = "list notes";
        let mut state = self.state.lock();
        state.record(OP)?;
        let actor = state.authenticate(OP, token)?;
        if actor.tenant_id != *tenant_id {
            return Err(forbidden(OP, "Cross-tenant access denied"));
        }

        Ok(state
            .notes
            .values()
            .rev()
            .filter(|n| n.tenant_id.as_ref() == Some(tenant_id))
            .cloned()
            .collect())
    }

    async fn create_note(&self, token: &BearerToken, draft: &NoteDraft) -> TransportResult<NoteAck> {
        const OP: &str = "create note";
        let mut state = self.state.lock();
        state.record(OP)?;
        let actor = state.authenticate(OP, token)?;
        policy::validate_draft(&actor, draft).map_err(|e| rejected(OP, e))?;
        if draft.owner != actor.id {
            return Err(forbidden(OP, "Notes can only be created for yourself"));
        }

        let plan = state.tenant_plan(OP, &actor.tenant_id)?;
        let owned = state
            .notes
            .values()
            .filter(|n| n.is_owned_by(actor.id))
            .count();
        policy::can_create_note(&actor, plan, owned).map_err(|e| forbidden(OP, e))?;

        let id = NoteId(state.next_note_id);
        state.next_note_id += 1;
        state.notes.insert(
            id,
            Note {
                id,
                title: draft.title.clone(),
                content: draft.content.clone(),
                owner: Some(actor.id),
                tenant_id: Some(actor.tenant_id.clone()),
                created_at: Some(Utc::now()),
                updated_at: None,
                created_by: Some(actor.username.clone()),
            },
        );
        Ok(NoteAck { id })
    }

    async fn update_note(
        &self,
        token: &BearerToken,
        id: NoteId,
        draft: &NoteDraft,
    ) -> TransportResult<NoteAck> {
        const OP: &str = "update note";
        let mut state = self.state.lock();
        state.record(OP)?;
        let actor = state.authenticate(OP, token)?;
        policy::validate_draft(&actor, draft).map_err(|e| rejected(OP, e))?;

        let note = state
            .notes
            .get_mut(&id)
            .ok_or_else(|| TransportError::status(OP, 404, Some("Note not found".into())))?;
        policy::can_modify_note(&actor, note).map_err(|e| forbidden(OP, e))?;

        note.title = draft.title.clone();
        note.content = draft.content.clone();
        note.updated_at = Some(Utc::now());
        Ok(NoteAck { id })
    }

    async fn delete_note(&self, token: &BearerToken, id: NoteId) -> TransportResult<DeleteOutcome> {
        const OP: &str = "delete note";
        let mut state = self.state.lock();
        state.record(OP)?;
        let actor = state.authenticate(OP, token)?;

        let Some(note) = state.notes.get(&id) else {
            return Ok(DeleteOutcome::AlreadyAbsent);
        };
        policy::can_modify_note(&actor, note).map_err(|e| forbidden(OP, e))?;

        state.notes.remove(&id);
        Ok(DeleteOutcome::Deleted)
    }
}

// ---------------------------------------------------------------------------
// Tenant
// ---------------------------------------------------------------------------

impl TenantApi for MemoryBackend {
    async fn current_tenant(&self, token: &BearerToken) -> TransportResult<TenantProfile> {
        const OP: &str = "current tenant";
        let mut state = self.state.lock();
        state.record(OP)?;
        let actor = state.authenticate(OP, token)?;
        let plan = state.tenant_plan(OP, &actor.tenant_id)?;

        Ok(TenantProfile {
            username: actor.username,
            role: actor.role,
            tenant_id: actor.tenant_id,
            plan,
        })
    }

    async fn upgrade_plan(&self, token: &BearerToken) -> TransportResult<PlanUpgrade> {
        const OP: &str = "upgrade plan";
        let mut state = self.state.lock();
        state.record(OP)?;
        let actor = state.authenticate(OP, token)?;
        if !actor.is_admin() {
            return Err(forbidden(OP, "Only admin can upgrade tenant plan"));
        }

        let tenant = state
            .tenants
            .get_mut(&actor.tenant_id)
            .ok_or_else(|| TransportError::status(OP, 404, Some("Tenant not found".into())))?;
        if tenant.is_pro() {
            return Ok(PlanUpgrade {
                plan: Plan::Pro,
                message: Some("Tenant is already on Pro plan".into()),
            });
        }
        tenant.mark_pro();
        Ok(PlanUpgrade {
            plan: Plan::Pro,
            message: Some("Tenant upgraded to Pro plan successfully".into()),
        })
    }
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

impl MemberApi for MemoryBackend {
    async fn count_members(
        &self,
        token: &BearerToken,
        tenant_id: &TenantId,
    ) -> TransportResult<MemberCount> {
        const OP: &str = "count members";
        let mut state = self.state.lock();
        state.record(OP)?;
        let actor = state.authenticate(OP, token)?;
        policy::can_view_members(&actor, tenant_id).map_err(|e| forbidden(OP, e))?;

        let member_count = state
            .users
            .values()
            .filter(|u| u.user.tenant_id == *tenant_id && u.user.role == Role::Member)
            .count() as u64;
        Ok(MemberCount { member_count })
    }

    async fn list_members(&self, token: &BearerToken) -> TransportResult<Vec<MemberRecord>> {
        const OP: &str = "list members";
        let mut state = self.state.lock();
        state.record(OP)?;
        let actor = state.authenticate(OP, token)?;
        policy::can_view_members(&actor, &actor.tenant_id).map_err(|e| forbidden(OP, e))?;

        Ok(state
            .users
            .values()
            .filter(|u| u.user.tenant_id == actor.tenant_id && u.user.role == Role::Member)
            .map(|u| MemberRecord::from(u.membership()))
            .collect())
    }

    async fn change_member_plan(
        &self,
        token: &BearerToken,
        user_id: UserId,
        new_plan: Plan,
    ) -> TransportResult<MemberResponse> {
        const OP: &str = "change member plan";
        let mut state = self.state.lock();
        state.record(OP)?;
        let actor = state.authenticate(OP, token)?;

        let target = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| TransportError::status(OP, 404, Some("Member not found".into())))?;
        policy::can_change_member_plan(&actor, &target.membership())
            .map_err(|e| forbidden(OP, e))?;
        if target.user.role != Role::Member {
            return Err(TransportError::status(
                OP,
                400,
                Some("Can only change plan for members".into()),
            ));
        }

        target.plan = new_plan;
        Ok(MemberResponse::Ack {
            message: Some(format!(
                "Plan changed to {new_plan} for user {}",
                target.user.username
            )),
        })
    }

    async fn invite_member(
        &self,
        token: &BearerToken,
        invitation: &Invitation,
    ) -> TransportResult<MemberResponse> {
        const OP: &str = "invite member";
        let mut state = self.state.lock();
        state.record(OP)?;
        let actor = state.authenticate(OP, token)?;
        policy::can_invite(&actor, &invitation.tenant_id).map_err(|e| forbidden(OP, e))?;

        let email = invitation.email.trim();
        if email.is_empty() {
            return Err(TransportError::status(OP, 422, Some("email is required".into())));
        }
        if state.users.values().any(|u| u.user.username == email) {
            return Err(TransportError::status(
                OP,
                400,
                Some("User with this email already exists".into()),
            ));
        }

        let id = UserId(state.next_user_id);
        state.next_user_id += 1;
        let stored = StoredUser {
            user: User {
                id,
                username: email.to_owned(),
                name: String::new(),
                role: invitation.role,
                tenant_id: invitation.tenant_id.clone(),
            },
            password: None,
            plan: Plan::Free,
        };
        state.users.insert(id, stored);
        Ok(MemberResponse::Ack {
            message: Some(format!("User invited successfully with email {email}")),
        })
    }
}
