//! REST client module for the remote auth API.
//!
//! This module provides the `ApiClient` for talking to the `/auth/*`
//! endpoints, and `ApiError` for the transport-level failures they produce.
//!
//! Authenticated endpoints use bearer token authentication; the token is
//! obtained from `/auth/login` and owned by the session layer.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::ApiError;
