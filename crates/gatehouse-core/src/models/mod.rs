//! Data models for the auth API.
//!
//! - `User`: the identity record returned by `/auth/me` and `/auth/users`
//! - `SignupRequest`: body of the account creation call
//! - `forms`: caller-side validation for login, signup and password reset input

pub mod forms;
pub mod signup;
pub mod user;

pub use forms::{FormError, LoginForm, PasswordResetForm, SignupForm};
pub use signup::SignupRequest;
pub use user::User;
