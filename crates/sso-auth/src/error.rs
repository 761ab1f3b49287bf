//! Authentication error types.
//!
//! Every failure carries the name of the operation that produced it and
//! one [`AuthErrorKind`]. The underlying cause stays reachable through
//! [`std::error::Error::source`] but is not part of the `Display`
//! output, so formatting an error for a caller never leaks driver or
//! crypto details.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Closed set of outcomes the auth layer reports to its callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthErrorKind {
    /// Unknown email or wrong password. The two are indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user already exists")]
    DuplicateUser,

    #[error("application lookup failed")]
    ApplicationLookupFailure,

    #[error("password hashing failed")]
    HashingFailure,

    #[error("token signing failed")]
    SigningFailure,

    #[error("storage failure")]
    StorageFailure,
}

#[derive(Debug, Error)]
#[error("{op}: {kind}")]
pub struct AuthError {
    op: &'static str,
    kind: AuthErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl AuthError {
    pub fn new(op: &'static str, kind: AuthErrorKind) -> Self {
        Self {
            op,
            kind,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    /// Name of the operation that failed.
    pub fn op(&self) -> &'static str {
        self.op
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn display_names_operation_and_kind_only() {
        let err = AuthError::new("auth.login", AuthErrorKind::StorageFailure)
            .with_source(std::io::Error::other("connection refused by 10.0.0.5"));

        assert_eq!(err.to_string(), "auth.login: storage failure");
        assert!(!err.to_string().contains("10.0.0.5"));
    }

    #[test]
    fn cause_is_preserved_for_inspection() {
        let err = AuthError::new("auth.register_new_user", AuthErrorKind::HashingFailure)
            .with_source(std::io::Error::other("out of memory"));

        let source = err.source().expect("source should be kept");
        assert_eq!(source.to_string(), "out of memory");
        assert_eq!(err.kind(), AuthErrorKind::HashingFailure);
        assert_eq!(err.op(), "auth.register_new_user");
    }
}
