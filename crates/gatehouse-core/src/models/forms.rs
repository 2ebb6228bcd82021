//! Caller-side validation for the values a front end collects before it
//! calls into the session manager. The manager itself never validates.

use thiserror::Error;

/// Longest address allowed by RFC 5321
const MAX_EMAIL_LENGTH: usize = 254;

const MAX_USERNAME_LENGTH: usize = 50;

const MAX_NAME_LENGTH: usize = 100;

/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{0} contains invalid characters")]
    InvalidCharacters(&'static str),

    #[error("Email address is not valid")]
    InvalidEmail,
}

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

fn check_field(
    field: &'static str,
    value: &str,
    required: bool,
    max: usize,
) -> Result<(), FormError> {
    if value.trim().is_empty() {
        return if required { Err(FormError::Required(field)) } else { Ok(()) };
    }
    if value.chars().count() > max {
        return Err(FormError::TooLong { field, max });
    }
    if !value.chars().all(is_valid_input_char) {
        return Err(FormError::InvalidCharacters(field));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), FormError> {
    check_field("Email", email, true, MAX_EMAIL_LENGTH)?;
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace) =>
        {
            Ok(())
        }
        _ => Err(FormError::InvalidEmail),
    }
}

fn check_password(password: &str) -> Result<(), FormError> {
    // Passwords are not trimmed; only emptiness, length and control chars matter
    if password.is_empty() {
        return Err(FormError::Required("Password"));
    }
    check_field("Password", password, true, MAX_PASSWORD_LENGTH)
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormError> {
        check_email(&self.email)?;
        check_password(&self.password)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FormError> {
        check_field("First name", &self.first_name, true, MAX_NAME_LENGTH)?;
        check_field("Last name", &self.last_name, true, MAX_NAME_LENGTH)?;
        check_email(&self.email)?;
        check_field("Username", &self.username, false, MAX_USERNAME_LENGTH)?;
        check_password(&self.password)
    }

    /// Convert into the wire request; blank optional fields are dropped
    pub fn into_request(self) -> super::SignupRequest {
        super::SignupRequest::new(self.email.trim(), self.password)
            .with_username(Some(self.username.trim().to_string()))
            .with_name(
                Some(self.first_name.trim().to_string()),
                Some(self.last_name.trim().to_string()),
            )
    }
}

/// Either half of the reset flow: the email for a reset request, or the
/// new password once the user holds a reset token.
#[derive(Debug, Clone)]
pub enum PasswordResetForm {
    Request { email: String },
    Update { password: String, reset_token: String },
}

impl PasswordResetForm {
    pub fn validate(&self) -> Result<(), FormError> {
        match self {
            PasswordResetForm::Request { email } => check_email(email),
            PasswordResetForm::Update { password, reset_token } => {
                check_password(password)?;
                check_field("Reset token", reset_token, true, usize::MAX)
            }
        }
    }
}
