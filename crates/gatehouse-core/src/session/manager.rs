//! The session manager: owns the current user, the persisted bearer
//! credential, and every call that can change either.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Url;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::auth::{StoreError, TokenStore};
use crate::models::{SignupRequest, User};

use super::error::{ErrorKind, Operation, SessionError};
use super::state::{SessionSnapshot, SessionState};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Remove the stored credential after a successful logout. When false the
    /// token is left for the server to invalidate on its side.
    pub clear_token_on_logout: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            clear_token_on_logout: true,
        }
    }
}

type CheckFuture = Shared<BoxFuture<'static, Option<User>>>;

/// A session check in progress. Callers arriving during the same epoch
/// await this instead of issuing their own request.
struct CheckFlight {
    id: u64,
    epoch: u64,
    future: CheckFuture,
}

struct Inner {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    options: SessionOptions,
    state: watch::Sender<SessionSnapshot>,
    /// Bumped by every applied login or logout. A check only applies its
    /// result if the epoch it started in is still current.
    epoch: AtomicU64,
    next_flight_id: AtomicU64,
    check_flight: Mutex<Option<CheckFlight>>,
    /// Serialises login and logout
    transition: tokio::sync::Mutex<()>,
}

/// Handle to the application's authentication session.
///
/// Construct one per application instance and hand clones to whatever needs
/// it; all clones share the same state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>, options: SessionOptions) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::initial());
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                options,
                state,
                epoch: AtomicU64::new(0),
                next_flight_id: AtomicU64::new(0),
                check_flight: Mutex::new(None),
                transition: tokio::sync::Mutex::new(()),
            }),
        }
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().state.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.state.borrow().current_user().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Watch the session for changes. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Validate the stored credential against the server and update the
    /// session from the answer.
    ///
    /// Never fails: a missing, rejected or unverifiable credential simply
    /// leaves the session anonymous. A 401/403 also removes the stored
    /// credential. Concurrent calls share a single request.
    pub async fn check_session(&self) -> Option<User> {
        let epoch = self.inner.epoch.load(Ordering::SeqCst);

        let (id, future) = {
            let mut slot = self.inner.lock_flight();
            let joinable = slot
                .as_ref()
                .filter(|flight| flight.epoch == epoch)
                .map(|flight| (flight.id, flight.future.clone()));
            match joinable {
                Some((id, future)) => {
                    debug!(flight = id, "Joining in-flight session check");
                    (id, future)
                }
                None => {
                    let id = self.inner.next_flight_id.fetch_add(1, Ordering::SeqCst);
                    let inner = Arc::clone(&self.inner);
                    let future = async move { inner.run_check(epoch).await }.boxed().shared();
                    *slot = Some(CheckFlight {
                        id,
                        epoch,
                        future: future.clone(),
                    });
                    (id, future)
                }
            }
        };

        let user = future.await;

        let mut slot = self.inner.lock_flight();
        if slot.as_ref().map(|f| f.id) == Some(id) {
            *slot = None;
        }
        user
    }

    /// Log in with email and password, persist the returned token, then load
    /// the user it belongs to. A rejected login leaves the session untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let _transition = self.inner.transition.lock().await;

        let token = self.inner.api.login(email, password).await.map_err(|e| {
            warn!(error = %e, "Login failed");
            SessionError::from_api(Operation::Login, e)
        })?;

        // Checks started before the new token existed must not win
        self.inner
            .install_token(&token)
            .map_err(|e| SessionError::from_store(Operation::Login, e))?;

        match self.check_session().await {
            Some(user) => {
                info!("Login successful");
                Ok(user)
            }
            None => {
                warn!("Login accepted but the session check did not return a user");
                Err(SessionError::new(Operation::Login, ErrorKind::InvalidResponse))
            }
        }
    }

    /// End the session on the server. Local state only changes once the
    /// server has confirmed.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let _transition = self.inner.transition.lock().await;

        let token = self.inner.load_token(Operation::Logout)?;
        self.inner.api.logout(token.as_deref()).await.map_err(|e| {
            warn!(error = %e, "Logout failed");
            SessionError::from_api(Operation::Logout, e)
        })?;

        self.inner.state.send_modify(|snap| {
            self.inner.epoch.fetch_add(1, Ordering::SeqCst);
            snap.state = SessionState::Anonymous;
            snap.is_loading = false;
        });
        info!("Logged out");

        if self.inner.options.clear_token_on_logout {
            self.inner
                .store
                .clear()
                .map_err(|e| SessionError::from_store(Operation::Logout, e))?;
        }
        Ok(())
    }

    /// Fetch the Google authorization URL. The caller sends the user there;
    /// the login itself completes outside this process.
    pub async fn initiate_google_auth(&self) -> Result<Url, SessionError> {
        let token = self.inner.load_token(Operation::GoogleAuth)?;
        self.inner
            .api
            .google_auth_url(token.as_deref())
            .await
            .map_err(|e| {
                warn!(error = %e, "Google auth error");
                SessionError::from_api(Operation::GoogleAuth, e)
            })
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), SessionError> {
        self.inner.api.request_password_reset(email).await.map_err(|e| {
            warn!(error = %e, "Password reset request error");
            SessionError::from_api(Operation::RequestPasswordReset, e)
        })
    }

    /// Set a new password using the one-time token from the reset email.
    /// The session credential is neither used nor touched.
    pub async fn update_password(&self, new_password: &str, reset_token: &str) -> Result<(), SessionError> {
        self.inner
            .api
            .update_password(new_password, reset_token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Password update error");
                SessionError::from_api(Operation::UpdatePassword, e)
            })
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<(), SessionError> {
        self.inner.api.signup(request).await.map_err(|e| {
            warn!(error = %e, "Signup error");
            SessionError::from_api(Operation::Signup, e)
        })?;
        info!("Account created");
        Ok(())
    }

    /// List the accounts visible to the current credential
    pub async fn list_users(&self) -> Result<Vec<User>, SessionError> {
        let token = self.inner.load_token(Operation::ListUsers)?;
        self.inner.api.fetch_users(token.as_deref()).await.map_err(|e| {
            warn!(error = %e, "Error fetching users");
            SessionError::from_api(Operation::ListUsers, e)
        })
    }
}

impl Inner {
    fn lock_flight(&self) -> MutexGuard<'_, Option<CheckFlight>> {
        self.check_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Save a freshly issued token and open a new epoch in one step. Runs
    /// under the state lock so it orders against check results and against
    /// the clearing of rejected tokens.
    fn install_token(&self, token: &str) -> Result<(), StoreError> {
        let mut saved = Ok(());
        self.state.send_if_modified(|_| {
            saved = self.store.save(token);
            if saved.is_ok() {
                self.epoch.fetch_add(1, Ordering::SeqCst);
            }
            false
        });
        saved
    }

    fn load_token(&self, operation: Operation) -> Result<Option<String>, SessionError> {
        self.store
            .load()
            .map_err(|e| SessionError::from_store(operation, e))
    }

    async fn run_check(&self, epoch: u64) -> Option<User> {
        let token = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential");
                None
            }
        };

        let outcome = match token {
            None => {
                debug!("No stored credential, session is anonymous");
                None
            }
            Some(token) => match self.api.fetch_me(&token).await {
                Ok(user) => {
                    debug!("Session check succeeded");
                    Some(user)
                }
                Err(e) => {
                    warn!(error = %e, "Auth check error");
                    if e.is_credential_rejected() {
                        self.discard_rejected_token(epoch, &token);
                    }
                    None
                }
            },
        };

        self.apply_check(epoch, outcome)
    }

    /// Drop a credential the server refused, unless a login or logout has
    /// moved the session on since the check started. Holds the state lock
    /// across load and clear so a concurrent `install_token` cannot land in
    /// between.
    fn discard_rejected_token(&self, epoch: u64, rejected: &str) {
        self.state.send_if_modified(|_| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                debug!(epoch, "Session moved on, keeping stored credential");
                return false;
            }
            match self.store.load() {
                Ok(Some(current)) if current == rejected => {
                    if let Err(e) = self.store.clear() {
                        warn!(error = %e, "Failed to clear rejected credential");
                    } else {
                        info!("Stored credential was rejected and has been cleared");
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Failed to read stored credential"),
            }
            false
        });
    }

    /// Publish a check result if it is still current. Returns the user the
    /// session ends up with.
    fn apply_check(&self, epoch: u64, outcome: Option<User>) -> Option<User> {
        let mut applied = None;
        self.state.send_modify(|snap| {
            snap.is_loading = false;
            if self.epoch.load(Ordering::SeqCst) == epoch {
                snap.state = match outcome {
                    Some(user) => SessionState::Authenticated(user),
                    None => SessionState::Anonymous,
                };
            } else {
                debug!(epoch, "Discarding stale session check");
            }
            applied = snap.current_user().cloned();
        });
        applied
    }
}
