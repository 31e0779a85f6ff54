//! Bearer credentials.
//!
//! The console never logs in or refreshes anything itself; it asks a
//! [`CredentialSource`] for the current token right before each call.
//! Tokens are plain shared strings, so a replaced or cleared token is freed
//! once the last in-flight request using it finishes.

use std::sync::{Arc, PoisonError, RwLock};

pub trait CredentialSource: Send + Sync {
    /// The token to attach, or `None` when the operator is signed out.
    fn bearer_token(&self) -> Option<Arc<str>>;
}

/// A token that can be swapped at runtime, e.g. after the session layer
/// rotates it.
#[derive(Debug, Clone, Default)]
pub struct StaticToken {
    token: Arc<RwLock<Option<Arc<str>>>>,
}

impl StaticToken {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(Arc::from(token.as_ref())))),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn set(&self, token: Option<&str>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token.map(Arc::from);
    }
}

impl CredentialSource for StaticToken {
    fn bearer_token(&self) -> Option<Arc<str>> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<C: CredentialSource + ?Sized> CredentialSource for Arc<C> {
    fn bearer_token(&self) -> Option<Arc<str>> {
        (**self).bearer_token()
    }
}
