//! Opaque authorization token.
//!
//! Every table operation receives an `AuthToken`. The engine passes it through
//! unexamined; access decisions belong to the caller's authorization layer.

use std::fmt;
use std::sync::Arc;

/// Capability token threaded through every table call.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthToken {
    subject: Arc<str>,
}

impl AuthToken {
    /// Creates a token for the given subject.
    pub fn new(subject: impl Into<Arc<str>>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    /// Token used by internal callers such as bootstrapping and tests.
    pub fn system() -> Self {
        Self::new("system")
    }

    /// Returns the subject this token was issued for.
    ///
    /// Used for log lines only.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthToken").field(&self.subject).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_subject() {
        let token = AuthToken::new("alice");
        assert_eq!(token.subject(), "alice");
        assert_eq!(AuthToken::system().subject(), "system");
        assert_eq!(format!("{:?}", token), "AuthToken(\"alice\")");
    }
}
