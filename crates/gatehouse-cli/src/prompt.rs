use std::io::{self, Write};

use anyhow::Result;

/// Lets scripts supply a password without a terminal
const PASSWORD_ENV: &str = "GATEHOUSE_PASSWORD";

/// Read one line from stdin, falling back to `default` on empty input
pub fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(value) => print!("{} [{}]: ", label, value),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match default {
        Some(value) if input.is_empty() => value.to_string(),
        _ => input.to_string(),
    })
}

pub fn prompt_password(label: &str) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    Ok(rpassword::prompt_password(format!("{}: ", label))?)
}

/// Ask twice and insist both entries match
pub fn prompt_new_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    let password = rpassword::prompt_password("New password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }
    Ok(password)
}
