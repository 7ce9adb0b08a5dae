//! Transport trait definitions for backend access abstraction.
//!
//! All transport operations are async and return [`TransportError`] on
//! failure; none of them apply authorization rules of their own. The
//! decision engine in [`crate::policy`] runs before a mutating call is
//! issued, and the backend's own checks remain authoritative.

use crate::error::TransportError;
use crate::models::{
    membership::{Invitation, MemberCount, MemberRecord, MemberResponse},
    note::{DeleteOutcome, Note, NoteAck, NoteDraft, NoteId},
    session::{BearerToken, LoginResponse},
    tenant::{Plan, PlanUpgrade, TenantId, TenantProfile},
    user::{Credential, UserId},
};

pub type TransportResult<T> = Result<T, TransportError>;

// ---------------------------------------------------------------------------
// Unauthenticated
// ---------------------------------------------------------------------------

pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`.
    fn login(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = TransportResult<LoginResponse>> + Send;
}

// ---------------------------------------------------------------------------
// Bearer-authenticated, tenant-scoped
// ---------------------------------------------------------------------------

pub trait NotesApi: Send + Sync {
    fn list_notes(
        &self,
        token: &BearerToken,
        tenant_id: &TenantId,
    ) -> impl Future<Output = TransportResult<Vec<Note>>> + Send;
    fn create_note(
        &self,
        token: &BearerToken,
        draft: &NoteDraft,
    ) -> impl Future<Output = TransportResult<NoteAck>> + Send;
    fn update_note(
        &self,
        token: &BearerToken,
        id: NoteId,
        draft: &NoteDraft,
    ) -> impl Future<Output = TransportResult<NoteAck>> + Send;
    /// A 404 is reported as [`DeleteOutcome::AlreadyAbsent`], not an error.
    fn delete_note(
        &self,
        token: &BearerToken,
        id: NoteId,
    ) -> impl Future<Output = TransportResult<DeleteOutcome>> + Send;
}

pub trait TenantApi: Send + Sync {
    /// `GET /tenants/me`: the caller's tenant and its current plan.
    fn current_tenant(
        &self,
        token: &BearerToken,
    ) -> impl Future<Output = TransportResult<TenantProfile>> + Send;

    /// `POST /tenants/upgrade` for the caller's own tenant.
    fn upgrade_plan(
        &self,
        token: &BearerToken,
    ) -> impl Future<Output = TransportResult<PlanUpgrade>> + Send;
}

pub trait MemberApi: Send + Sync {
    fn count_members(
        &self,
        token: &BearerToken,
        tenant_id: &TenantId,
    ) -> impl Future<Output = TransportResult<MemberCount>> + Send;
    /// Lists the caller's own tenant.
    fn list_members(
        &self,
        token: &BearerToken,
    ) -> impl Future<Output = TransportResult<Vec<MemberRecord>>> + Send;
    fn change_member_plan(
        &self,
        token: &BearerToken,
        user_id: UserId,
        new_plan: Plan,
    ) -> impl Future<Output = TransportResult<MemberResponse>> + Send;
    fn invite_member(
        &self,
        token: &BearerToken,
        invitation: &Invitation,
    ) -> impl Future<Output = TransportResult<MemberResponse>> + Send;
}

/// Everything the workspace needs from a backend.
pub trait Backend: AuthApi + NotesApi + TenantApi + MemberApi {}

impl<T> Backend for T where T: AuthApi + NotesApi + TenantApi + MemberApi {}
