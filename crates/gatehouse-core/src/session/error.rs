use std::fmt;

use thiserror::Error;

use crate::api::ApiError;
use crate::auth::StoreError;

/// The session operation a failure came from. Each carries the message shown
/// when the server does not provide one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CheckSession,
    Login,
    Logout,
    GoogleAuth,
    RequestPasswordReset,
    UpdatePassword,
    Signup,
    ListUsers,
}

impl Operation {
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::CheckSession => "Auth check failed",
            Operation::Login => "Login failed",
            Operation::Logout => "Logout failed",
            Operation::GoogleAuth => "Failed to initialize Google authentication",
            Operation::RequestPasswordReset => "Password reset request failed",
            Operation::UpdatePassword => "Password update failed",
            Operation::Signup => "Failed to create account",
            Operation::ListUsers => "Failed to fetch users",
        }
    }

    /// Google auth always reports its fixed message; the rest prefer the
    /// server's own wording.
    fn uses_server_message(&self) -> bool {
        !matches!(self, Operation::GoogleAuth)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CheckSession => "check_session",
            Operation::Login => "login",
            Operation::Logout => "logout",
            Operation::GoogleAuth => "google_auth",
            Operation::RequestPasswordReset => "request_password_reset",
            Operation::UpdatePassword => "update_password",
            Operation::Signup => "signup",
            Operation::ListUsers => "list_users",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never reached the server or the response never arrived
    Network,
    /// The server answered with a non-2xx status
    Rejected { status: u16 },
    /// The server answered 2xx but the body was not what was expected
    InvalidResponse,
    /// The local credential store failed
    Storage,
}

/// Single error type surfaced by every session operation. `Display` is the
/// human-readable message meant for the user.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct SessionError {
    operation: Operation,
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SessionError {
    pub(crate) fn new(operation: Operation, kind: ErrorKind) -> Self {
        Self {
            operation,
            kind,
            message: operation.fallback_message().to_string(),
            source: None,
        }
    }

    pub(crate) fn from_api(operation: Operation, err: ApiError) -> Self {
        let kind = match &err {
            ApiError::NetworkError(e) => match e.status() {
                Some(status) => ErrorKind::Rejected { status: status.as_u16() },
                None => ErrorKind::Network,
            },
            ApiError::InvalidResponse(_) | ApiError::InvalidUrl(_) => ErrorKind::InvalidResponse,
            other => ErrorKind::Rejected {
                status: other.status().map(|s| s.as_u16()).unwrap_or_default(),
            },
        };

        let message = err
            .server_message()
            .filter(|_| operation.uses_server_message())
            .unwrap_or(operation.fallback_message())
            .to_string();

        Self {
            operation,
            kind,
            message,
            source: Some(Box::new(err)),
        }
    }

    pub(crate) fn from_store(operation: Operation, err: StoreError) -> Self {
        Self {
            operation,
            kind: ErrorKind::Storage,
            message: operation.fallback_message().to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_network(&self) -> bool {
        self.kind == ErrorKind::Network
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_server_message_preferred() {
        let api = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"error":"Invalid credentials"}"#);
        let err = SessionError::from_api(Operation::Login, api);
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.kind(), ErrorKind::Rejected { status: 401 });
        assert_eq!(err.operation(), Operation::Login);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_fallback_when_server_silent() {
        let api = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        let err = SessionError::from_api(Operation::RequestPasswordReset, api);
        assert_eq!(err.message(), "Password reset request failed");
        assert_eq!(err.kind(), ErrorKind::Rejected { status: 500 });
    }

    #[test]
    fn test_google_auth_message_is_fixed() {
        let api = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"OAuth not configured"}"#);
        let err = SessionError::from_api(Operation::GoogleAuth, api);
        assert_eq!(err.message(), "Failed to initialize Google authentication");
    }

    #[test]
    fn test_invalid_response_kind() {
        let api = ApiError::InvalidResponse("missing token".to_string());
        let err = SessionError::from_api(Operation::Login, api);
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        assert_eq!(err.message(), "Login failed");
        assert!(!err.is_network());
    }

    #[test]
    fn test_storage_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SessionError::from_store(Operation::Logout, StoreError::Io(io));
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.message(), "Logout failed");
        assert!(err.source().unwrap().to_string().contains("denied"));
    }

    #[test]
    fn test_every_operation_has_fallback() {
        for op in [
            Operation::CheckSession,
            Operation::Login,
            Operation::Logout,
            Operation::GoogleAuth,
            Operation::RequestPasswordReset,
            Operation::UpdatePassword,
            Operation::Signup,
            Operation::ListUsers,
        ] {
            assert!(!op.fallback_message().is_empty(), "{} has no fallback", op);
        }
    }
}
