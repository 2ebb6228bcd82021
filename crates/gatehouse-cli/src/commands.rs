//! One handler per subcommand. Each drives the session manager and prints
//! the outcome; error display is left to `main`.

use anyhow::Result;
use gatehouse_core::models::{LoginForm, PasswordResetForm, SignupForm};
use gatehouse_core::{Config, SessionManager, User};
use tracing::warn;

use crate::cli::{Command, ResetAction};
use crate::prompt::{prompt_line, prompt_new_password, prompt_password};

const SIGNUP_NOTICE: &str =
    "Account created successfully! Please check your email to verify your account.";

pub async fn dispatch(command: Command, session: &SessionManager, config: &Config) -> Result<()> {
    match command {
        Command::Whoami => whoami(session).await,
        Command::Login { email } => login(session, config, email).await,
        Command::Logout => {
            session.logout().await?;
            println!("Logged out");
            Ok(())
        }
        Command::Signup {
            email,
            first_name,
            last_name,
            username,
        } => {
            let form = SignupForm {
                first_name,
                last_name,
                email,
                username: username.unwrap_or_default(),
                password: prompt_password("Password")?,
            };
            signup(session, form).await
        }
        Command::Users => {
            let users = session.list_users().await?;
            print!("{}", format_user_list(&users));
            Ok(())
        }
        Command::Google => {
            let url = session.initiate_google_auth().await?;
            println!("Open this URL in your browser to continue with Google:");
            println!("{}", url);
            Ok(())
        }
        Command::ResetPassword { action } => reset_password(session, action).await,
    }
}

async fn whoami(session: &SessionManager) -> Result<()> {
    match session.check_session().await {
        Some(user) => {
            println!("{}", user.label());
            println!("  {}", user.email);
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

async fn login(session: &SessionManager, config: &Config, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_line("Email", config.last_email.as_deref())?,
    };
    let form = LoginForm {
        email: email.trim().to_string(),
        password: prompt_password("Password")?,
    };
    form.validate()?;

    let user = session.login(&form.email, &form.password).await?;
    println!("Logged in as {}", user.label());

    // `config` carries this run's overrides; only the email goes back to disk
    if let Err(e) = Config::remember_last_email(&form.email) {
        warn!(error = %e, "Failed to save config");
    }
    Ok(())
}

async fn signup(session: &SessionManager, form: SignupForm) -> Result<()> {
    form.validate()?;
    session.signup(&form.into_request()).await?;
    println!("{}", SIGNUP_NOTICE);
    Ok(())
}

async fn reset_password(session: &SessionManager, action: ResetAction) -> Result<()> {
    match action {
        ResetAction::Request { email } => {
            let email = email.trim().to_string();
            PasswordResetForm::Request { email: email.clone() }.validate()?;
            session.request_password_reset(&email).await?;
            println!("Password reset email sent to {}", email);
        }
        ResetAction::Update { token } => {
            let password = prompt_new_password()?;
            PasswordResetForm::Update {
                password: password.clone(),
                reset_token: token.clone(),
            }
            .validate()?;
            session.update_password(&password, &token).await?;
            println!("Password updated");
        }
    }
    Ok(())
}

/// Render users the way the list view shows them: label, then email
pub fn format_user_list(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found\n".to_string();
    }
    users
        .iter()
        .map(|u| format!("{}\n  {}\n", u.label(), u.email))
        .collect()
}
