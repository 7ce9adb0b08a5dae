//! Identity context: the authenticated actor and its bearer credential.
//!
//! The context is a plain owned value. Mutation goes through `&mut self`,
//! so there is exactly one writer at a time and every decision reads an
//! immutable borrow of it.

use chrono::{DateTime, Utc};
use noteplane_core::error::AuthError;
use noteplane_core::models::session::BearerToken;
use noteplane_core::models::tenant::Plan;
use noteplane_core::models::user::User;

use crate::token::TokenClaims;

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    pub actor: User,
    /// The actor's own membership plan (distinct from the tenant plan).
    pub membership_plan: Plan,
    pub token: BearerToken,
    /// `None` when the token is opaque.
    pub claims: Option<TokenClaims>,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.as_ref().and_then(TokenClaims::expires_at)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_secs: u64) -> bool {
        self.claims
            .as_ref()
            .is_some_and(|claims| claims.is_expired_at(now, leeway_secs))
    }
}

#[derive(Debug, Default)]
pub struct IdentityContext {
    session: Option<Session>,
}

impl IdentityContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new session in one step.
    pub(crate) fn install(&mut self, session: Session) -> Option<Session> {
        self.session.replace(session)
    }

    /// Drop the session. Returns whether one was held.
    pub fn clear(&mut self) -> bool {
        self.session.take().is_some()
    }

    pub fn current_actor(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.actor)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The held session, provided its token has not expired.
    pub fn require(&self, now: DateTime<Utc>, leeway_secs: u64) -> Result<&Session, AuthError> {
        match &self.session {
            Some(session) if !session.is_expired_at(now, leeway_secs) => Ok(session),
            _ => Err(AuthError::Unauthenticated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noteplane_core::models::tenant::TenantId;
    use noteplane_core::models::user::{Role, UserId};

    fn session(exp: Option<i64>) -> Session {
        Session {
            actor: User {
                id: UserId(1),
                username: "acmeAdmin".into(),
                name: String::new(),
                role: Role::Admin,
                tenant_id: TenantId::from("acme"),
            },
            membership_plan: Plan::Free,
            token: BearerToken::new("t"),
            claims: exp.map(|exp| TokenClaims {
                exp: Some(exp),
                ..Default::default()
            }),
            signed_in_at: Utc::now(),
        }
    }

    #[test]
    fn empty_context_has_no_actor() {
        let ctx = IdentityContext::new();
        assert!(ctx.current_actor().is_none());
        assert_eq!(
            ctx.require(Utc::now(), 0).unwrap_err(),
            AuthError::Unauthenticated
        );
    }

    #[test]
    fn clear_is_idempotent() {
        let mut ctx = IdentityContext::new();
        ctx.install(session(None));
        assert!(ctx.clear());
        assert!(!ctx.clear());
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn install_replaces_previous_session() {
        let mut ctx = IdentityContext::new();
        assert!(ctx.install(session(None)).is_none());
        let previous = ctx.install(session(Some(Utc::now().timestamp() + 3600)));
        assert!(previous.is_some());
        assert!(ctx.session().unwrap().claims.is_some());
    }

    #[test]
    fn expired_session_is_not_usable() {
        let mut ctx = IdentityContext::new();
        ctx.install(session(Some(Utc::now().timestamp() - 5)));
        assert!(ctx.current_actor().is_some());
        assert!(ctx.require(Utc::now(), 0).is_err());
    }

    #[test]
    fn opaque_session_never_expires_locally() {
        let mut ctx = IdentityContext::new();
        ctx.install(session(None));
        assert!(ctx.require(Utc::now(), 30).is_ok());
    }
}
