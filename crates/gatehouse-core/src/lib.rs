//! Core library for gatehouse.
//!
//! Owns an authentication session against a remote `/auth/*` HTTP API:
//!
//! - `api`: `ApiClient`, one typed method per endpoint
//! - `auth`: where the bearer credential is persisted (`TokenStore`)
//! - `session`: `SessionManager`, the only thing allowed to change who the
//!   client is logged in as
//! - `models`: the identity record, signup body and form validation
//! - `config`: on-disk and environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod session;

pub use api::{ApiClient, ApiError};
pub use auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};
pub use config::{Config, TokenStoreKind};
pub use models::{SignupRequest, User};
pub use session::{ErrorKind, SessionError, SessionManager, SessionOptions, SessionSnapshot, SessionState};
