//! Authentication service: login and logout orchestration.

use chrono::Utc;
use noteplane_core::error::{AuthError, NoteplaneError, NoteplaneResult};
use noteplane_core::models::tenant::Tenant;
use noteplane_core::models::user::Credential;
use noteplane_core::transport::AuthApi;
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::identity::{IdentityContext, Session};
use crate::token;

/// Statuses the login endpoint uses to say "wrong username or password".
const CREDENTIAL_REJECTION_STATUSES: [u16; 5] = [400, 401, 403, 404, 422];

/// Successful login result.
#[derive(Debug, Clone)]
pub struct LoginOutput {
    pub session: Session,
    /// Initial tenant snapshot derived from the login response.
    pub tenant: Tenant,
}

/// Authentication service.
///
/// Generic over the transport so that the auth layer has no dependency
/// on the HTTP crate.
pub struct AuthService<A: AuthApi> {
    api: A,
    config: AuthConfig,
}

impl<A: AuthApi> AuthService<A> {
    pub fn new(api: A, config: AuthConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Authenticate with username + password and install the resulting
    /// session into `identity`.
    ///
    /// The context is only touched after the backend accepted the
    /// credential; on any failure the previously held session (if any)
    /// stays in place.
    pub async fn login(
        &self,
        identity: &mut IdentityContext,
        credential: Credential,
    ) -> NoteplaneResult<LoginOutput> {
        // 1. Reject obviously empty input without a round trip.
        if credential.is_blank() {
            return Err(AuthError::InvalidCredential.into());
        }

        // 2. Ask the backend.
        let response = self.api.login(&credential).await.map_err(|err| {
            match err.status_code() {
                Some(status) if CREDENTIAL_REJECTION_STATUSES.contains(&status) => {
                    warn!(username = %credential.username, status, "Login rejected");
                    NoteplaneError::from(AuthError::InvalidCredential)
                }
                _ => {
                    warn!(username = %credential.username, error = %err, "Login failed");
                    NoteplaneError::from(err)
                }
            }
        })?;

        // 3. Read token claims. Opaque tokens are accepted with unknown
        //    expiry; an already-expired token is not.
        let claims = match token::inspect(&response.access_token) {
            Ok(claims) => {
                token::ensure_fresh(&claims, Utc::now(), self.config.expiry_leeway_secs)?;
                Some(claims)
            }
            Err(e) => {
                debug!(error = %e, "Access token is opaque; expiry unknown");
                None
            }
        };

        // 4. Swap the session in.
        let session = Session {
            actor: response.user.to_user(),
            membership_plan: response.user.plan(),
            token: response.access_token,
            claims,
            signed_in_at: Utc::now(),
        };
        let tenant = response.user.initial_tenant();
        identity.install(session.clone());

        info!(
            user_id = %session.actor.id,
            tenant_id = %session.actor.tenant_id,
            role = %session.actor.role,
            "Signed in"
        );

        Ok(LoginOutput { session, tenant })
    }

    /// Clear the held session. Safe to call when signed out.
    pub fn logout(&self, identity: &mut IdentityContext) {
        if let Some(actor) = identity.current_actor() {
            info!(user_id = %actor.id, tenant_id = %actor.tenant_id, "Signed out");
        }
        identity.clear();
    }

    /// The current session, if present and not expired.
    pub fn authorize<'a>(&self, identity: &'a IdentityContext) -> Result<&'a Session, AuthError> {
        identity.require(Utc::now(), self.config.expiry_leeway_secs)
    }
}
