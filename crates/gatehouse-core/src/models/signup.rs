use serde::Serialize;

/// Body of `POST /auth/signup`. Empty optional fields are left out of the
/// JSON entirely rather than sent as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl SignupRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = non_blank(username);
        self
    }

    pub fn with_name(mut self, firstname: Option<String>, lastname: Option<String>) -> Self {
        self.firstname = non_blank(firstname);
        self.lastname = non_blank(lastname);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_body_omits_blank_optionals() {
        let req = SignupRequest::new("j@example.com", "hunter22")
            .with_username(Some(String::new()))
            .with_name(Some("John".to_string()), Some("  ".to_string()));

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "email": "j@example.com",
                "password": "hunter22",
                "firstname": "John",
            })
        );
    }

    #[test]
    fn test_signup_body_full() {
        let req = SignupRequest::new("j@example.com", "hunter22")
            .with_username(Some("johnsmith".to_string()))
            .with_name(Some("John".to_string()), Some("Smith".to_string()));

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["username"], "johnsmith");
        assert_eq!(body["lastname"], "Smith");
    }
}
