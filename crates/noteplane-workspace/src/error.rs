//! Mapping of backend failures onto the domain error taxonomy.

use noteplane_core::error::{AuthError, NoteplaneError, TransportError};

/// A 401 means the session is no longer usable; anything else stays a
/// transport error carrying the operation name.
pub(crate) fn from_transport(err: TransportError) -> NoteplaneError {
    if err.status_code() == Some(401) {
        return AuthError::Unauthenticated.into();
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_becomes_unauthenticated() {
        let err = from_transport(TransportError::status("list notes", 401, None));
        assert!(matches!(err, NoteplaneError::Auth(AuthError::Unauthenticated)));
    }

    #[test]
    fn other_failures_stay_transport_errors() {
        let err = from_transport(TransportError::status("list notes", 500, None));
        assert!(matches!(err, NoteplaneError::Transport(_)));
        let err = from_transport(TransportError::network("list notes", "refused"));
        assert!(matches!(err, NoteplaneError::Transport(_)));
    }
}
