//! Committee record.
//!
//! Committees are listed by their display `order`, not by creation time.

use super::{require_max_chars, require_text, DocumentId, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const COMMITTEE_NAME_MAX_CHARS: usize = 120;
pub const COMMITTEE_DESCRIPTION_MAX_CHARS: usize = 2000;
pub const COMMITTEE_ACTIVITY_MAX_CHARS: usize = 500;

/// Stored committee document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Committee {
    pub id: DocumentId,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    /// Display position; lower values are listed first.
    pub order: i64,
    /// Free-text summary of what the committee is currently running.
    pub activity: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Committee {
    pub fn new(input: &CommitteeInput, image_url: Option<String>) -> Self {
        let mut committee = Self {
            id: Uuid::new_v4(),
            name: String::new(),
            description: String::new(),
            image_url,
            order: 0,
            activity: String::new(),
            created_at: 0,
            updated_at: 0,
        };
        committee.apply(input);
        committee
    }

    pub fn apply(&mut self, input: &CommitteeInput) {
        self.name = input.name.trim().to_string();
        self.description = input.description.trim().to_string();
        self.order = input.order;
        self.activity = input.activity.trim().to_string();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, &self.description, self.order, &self.activity)
    }
}

/// Editable committee fields submitted by the admin form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub activity: String,
}

impl CommitteeInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, &self.description, self.order, &self.activity)
    }
}

fn validate_fields(
    name: &str,
    description: &str,
    order: i64,
    activity: &str,
) -> Result<(), ValidationError> {
    require_text("name", name, COMMITTEE_NAME_MAX_CHARS)?;
    require_max_chars("description", description, COMMITTEE_DESCRIPTION_MAX_CHARS)?;
    require_max_chars("activity", activity, COMMITTEE_ACTIVITY_MAX_CHARS)?;
    if order < 0 {
        return Err(ValidationError::OutOfRange {
            field: "order",
            expected: "zero or greater",
        });
    }
    Ok(())
}
