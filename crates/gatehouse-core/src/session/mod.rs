//! Authentication session management.
//!
//! `SessionManager` is the single owner of who the client is logged in as.
//! Front ends read `SessionSnapshot`s or subscribe to changes; only the
//! manager's operations can move the session between states:
//!
//! - `Unknown` until the first `check_session` completes
//! - `Authenticated` after a successful check or login
//! - `Anonymous` after a failed check or a logout
//!
//! Every failure is reported as a `SessionError` whose message is fit to show
//! to a user.

pub mod error;
pub mod manager;
pub mod state;

pub use error::{ErrorKind, Operation, SessionError};
pub use manager::{SessionManager, SessionOptions};
pub use state::{SessionSnapshot, SessionState};
