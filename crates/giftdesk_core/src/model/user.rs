//! Back-office user record and roles.
//!
//! # Invariants
//! - `email` is stored trimmed and lowercase, and is unique per store.
//! - `role` decides which back-office operations a session may run.

use super::{require_text, DocumentId, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const USER_NAME_MAX_CHARS: usize = 120;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

/// Access level of a back-office user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Editor,
    #[default]
    Viewer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

/// Stored user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DocumentId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn new(input: &UserInput) -> Self {
        let mut user = Self {
            id: Uuid::new_v4(),
            name: String::new(),
            email: String::new(),
            role: Role::Viewer,
            created_at: 0,
            updated_at: 0,
        };
        user.apply(input);
        user
    }

    pub fn apply(&mut self, input: &UserInput) {
        self.name = input.name.trim().to_string();
        self.email = normalize_email(&input.email);
        self.role = input.role;
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, &self.email)
    }
}

/// User fields submitted as JSON by the admin form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl UserInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, &normalize_email(&self.email))
    }
}

/// Canonical email form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_fields(name: &str, email: &str) -> Result<(), ValidationError> {
    require_text("name", name, USER_NAME_MAX_CHARS)?;
    if email.is_empty() {
        return Err(ValidationError::BlankField("email"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{normalize_email, Role, UserInput};
    use crate::model::ValidationError;

    #[test]
    fn email_shape_is_checked_after_normalization() {
        let valid = UserInput {
            name: "Asha".to_string(),
            email: "  Asha@Example.COM ".to_string(),
            role: Role::Editor,
        };
        assert!(valid.validate().is_ok());
        assert_eq!(normalize_email(&valid.email), "asha@example.com");

        let invalid = UserInput {
            email: "asha.example.com".to_string(),
            ..valid
        };
        assert!(matches!(
            invalid.validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn role_defaults_to_viewer() {
        let input: UserInput =
            serde_json::from_str(r#"{"name":"Ravi","email":"ravi@example.com"}"#)
                .expect("user input should deserialize");
        assert_eq!(input.role, Role::Viewer);
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
    }
}
