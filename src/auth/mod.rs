//! Authentication check and credential hashing
//!
//! The engine does not issue or verify tokens — that belongs to the
//! transport collaborator. It consumes an already-resolved identity on the
//! request context and enforces the binary authenticated check at the start
//! of every query and mutation entry point.

use std::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::schema::TransformFn;

/// Authenticated identity resolved by the transport layer
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject: String,
    pub username: Option<String>,
    pub role: Option<String>,
}

impl Identity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            username: None,
            role: None,
        }
    }
}

/// Per-request context carried into every entry point
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    identity: Option<Identity>,
}

impl RequestContext {
    /// A context carrying an authenticated identity
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// A context with no identity
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The identity, if any
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

/// Get the authenticated identity, or reject the request.
pub fn check_auth(ctx: &RequestContext) -> EngineResult<&Identity> {
    ctx.identity().ok_or(EngineError::Unauthenticated)
}

/// A write transform that bcrypt-hashes field values before persistence.
///
/// Register on an entity type for its credential fields; the raw value is
/// never stored or echoed.
pub fn password_transform(cost: u32) -> Arc<TransformFn> {
    Arc::new(move |field, value| {
        bcrypt::hash(value, cost)
            .map_err(|e| EngineError::Internal(format!("hashing '{}' failed: {}", field, e)))
    })
}

/// Verify a raw password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> EngineResult<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| EngineError::Internal(format!("password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn anonymous_context_is_rejected() {
        let err = check_auth(&RequestContext::anonymous()).unwrap_err();
        assert_matches!(err, EngineError::Unauthenticated);
    }

    #[test]
    fn authenticated_context_passes() {
        let ctx = RequestContext::authenticated(Identity::new("user_1"));
        let identity = check_auth(&ctx).unwrap();
        assert_eq!(identity.subject, "user_1");
    }

    #[test]
    fn password_transform_hashes_and_verifies() {
        let transform = password_transform(4);
        let stored = transform("password", "hunter2").unwrap();
        assert_ne!(stored, "hunter2");
        assert!(verify_password("hunter2", &stored).unwrap());
        assert!(!verify_password("wrong", &stored).unwrap());
    }
}
