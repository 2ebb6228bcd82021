use crate::models::User;

/// Where the session stands. `Unknown` only until the first check completes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Authenticated(User),
    Anonymous,
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            SessionState::Unknown | SessionState::Anonymous => None,
        }
    }
}

/// Read-only view of the session handed to front ends.
///
/// Only the session manager can build or change one, so the user and the
/// loading flag always move together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub(crate) state: SessionState,
    pub(crate) is_loading: bool,
}

impl SessionSnapshot {
    pub(crate) fn initial() -> Self {
        Self {
            state: SessionState::Unknown,
            is_loading: true,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        self.state.user()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot() {
        let snap = SessionSnapshot::initial();
        assert_eq!(snap.state(), &SessionState::Unknown);
        assert!(snap.is_loading());
        assert!(!snap.is_authenticated());
        assert!(snap.current_user().is_none());
    }

    #[test]
    fn test_authenticated_exposes_user() {
        let user = User {
            id: None,
            email: "j@example.com".to_string(),
            first_name: Some("J".to_string()),
            last_name: None,
            username: None,
        };
        let snap = SessionSnapshot {
            state: SessionState::Authenticated(user.clone()),
            is_loading: false,
        };
        assert!(snap.is_authenticated());
        assert_eq!(snap.current_user(), Some(&user));
    }
}
