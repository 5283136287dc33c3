//! Caller identity resolution
//!
//! The orchestrator receives an [`IdentityResolver`] explicitly instead of
//! looking the caller up through global state, which keeps the pipeline
//! testable with fakes.

use serde::{Deserialize, Serialize};

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier, matched against `Note::author_id`
    pub user_id: String,
}

impl Identity {
    /// Create an identity for `user_id`
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Auth collaborator consulted before any data access
pub trait IdentityResolver: Send + Sync {
    /// Resolve the current caller, or `None` when nobody is signed in
    fn resolve_caller(&self) -> Option<Identity>;
}

/// Resolver that always answers with the same (possibly absent) identity
///
/// The CLI builds one from `--user`, `NOTESAI_USER` or `identity.user_id`.
///
/// # Examples
///
/// ```
/// use notesai::auth::{IdentityResolver, StaticIdentityResolver};
///
/// let resolver = StaticIdentityResolver::from_user_id(Some("alice".to_string()));
/// assert_eq!(resolver.resolve_caller().unwrap().user_id, "alice");
///
/// let anonymous = StaticIdentityResolver::anonymous();
/// assert!(anonymous.resolve_caller().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityResolver {
    identity: Option<Identity>,
}

impl StaticIdentityResolver {
    /// Resolver for a known identity
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Resolver with no signed-in caller
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    /// Build from an optional user id; blank ids count as absent
    pub fn from_user_id(user_id: Option<String>) -> Self {
        let identity = user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .map(Identity::new);
        Self { identity }
    }
}

impl IdentityResolver for StaticIdentityResolver {
    fn resolve_caller(&self) -> Option<Identity> {
        self.identity.clone()
    }
}
