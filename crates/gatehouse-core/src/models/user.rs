use serde::{Deserialize, Deserializer, Serialize};

/// Read-only projection of a remote account, as returned by `/auth/me`
/// and `/auth/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(rename = "firstName", alias = "firstname", alias = "first_name", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", alias = "lastname", alias = "last_name", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Account ids come back as strings from some backends and integers from others
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|id| match id {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    }))
}

impl User {
    /// "First Last", skipping whichever part is missing
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn username_display(&self) -> &str {
        self.username
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or("No username")
    }

    /// Label used in user listings: "First Last (username)".
    /// Falls back to the email when the account has no name on file.
    pub fn label(&self) -> String {
        let name = self.full_name();
        let name = if name.is_empty() { self.email.as_str() } else { name.as_str() };
        format!("{} ({})", name, self.username_display())
    }
}
