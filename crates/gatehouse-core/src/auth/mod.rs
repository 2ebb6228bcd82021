//! Credential persistence for the session's bearer token.
//!
//! This module provides:
//! - `TokenStore`: the storage seam the session manager writes through
//! - `FileTokenStore`: JSON file in the data directory
//! - `KeyringTokenStore`: OS-level storage via keyring
//! - `MemoryTokenStore`: process-local, for tests and throwaway sessions
//!
//! All stores keep a single credential under the fixed `authToken` key.

pub mod credentials;
pub mod store;

pub use credentials::KeyringTokenStore;
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, StoredCredential, TokenStore, TOKEN_KEY};
