use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gatehouse_core::TokenStoreKind;

#[derive(Parser, Debug)]
#[command(name = "gatehouse", version, about = "Log in to, and manage an account on, an auth backend")]
pub struct Cli {
    /// Auth backend base URL (overrides GATEHOUSE_BACKEND_URL and the config file)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Where to keep the session token: file, keyring or memory
    #[arg(long, global = true, value_parser = parse_store)]
    pub store: Option<TokenStoreKind>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show which account the stored session belongs to
    Whoami,

    /// Log in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },

    /// End the current session
    Logout,

    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        username: Option<String>,
    },

    /// List the accounts visible to the current session
    Users,

    /// Print the URL that starts a Google sign-in
    Google,

    /// Request a reset email, or set a new password with a reset token
    ResetPassword {
        #[command(subcommand)]
        action: ResetAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ResetAction {
    /// Send a password reset email
    Request { email: String },

    /// Set a new password using the token from the reset email
    Update {
        #[arg(long)]
        token: String,
    },
}

fn parse_store(s: &str) -> Result<TokenStoreKind, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_with_globals() {
        let cli = Cli::try_parse_from([
            "gatehouse",
            "login",
            "--email",
            "j@example.com",
            "--backend-url",
            "http://localhost:3000",
            "--store",
            "memory",
        ])
        .unwrap();

        assert_eq!(cli.backend_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(cli.store, Some(TokenStoreKind::Memory));
        assert!(matches!(cli.command, Command::Login { email: Some(ref e) } if e == "j@example.com"));
    }

    #[test]
    fn test_parse_signup() {
        let cli = Cli::try_parse_from([
            "gatehouse",
            "signup",
            "--email",
            "j@example.com",
            "--first-name",
            "John",
            "--last-name",
            "Smith",
        ])
        .unwrap();

        match cli.command {
            Command::Signup { username, first_name, .. } => {
                assert_eq!(first_name, "John");
                assert!(username.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_reset_password() {
        let cli = Cli::try_parse_from(["gatehouse", "reset-password", "update", "--token", "abc"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::ResetPassword { action: ResetAction::Update { ref token } } if token == "abc"
        ));

        let cli = Cli::try_parse_from(["gatehouse", "reset-password", "request", "j@example.com"]).unwrap();
        assert!(matches!(cli.command, Command::ResetPassword { action: ResetAction::Request { .. } }));
    }

    #[test]
    fn test_rejects_unknown_store() {
        assert!(Cli::try_parse_from(["gatehouse", "--store", "floppy", "whoami"]).is_err());
    }
}
