//! Category record.
//!
//! # Invariants
//! - `name` is non-blank and at most `CATEGORY_NAME_MAX_CHARS` characters.
//! - Every stored category carries exactly one image URL.

use super::{require_text, DocumentId, RecordStatus, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CATEGORY_NAME_MAX_CHARS: usize = 120;

/// Stored category document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: DocumentId,
    pub name: String,
    pub image_url: String,
    pub status: RecordStatus,
    /// Epoch milliseconds, assigned by the store.
    pub created_at: i64,
    /// Epoch milliseconds, refreshed by the store on every write.
    pub updated_at: i64,
}

impl Category {
    /// Creates a category with a generated ID and store-assigned timestamps.
    pub fn new(input: &CategoryInput, image_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            image_url: image_url.into(),
            status: input.status,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Replaces editable fields from form input, keeping identity and image.
    pub fn apply(&mut self, input: &CategoryInput) {
        self.name = input.name.trim().to_string();
        self.status = input.status;
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, CATEGORY_NAME_MAX_CHARS)?;
        if self.image_url.trim().is_empty() {
            return Err(ValidationError::ImageCount {
                min: 1,
                max: 1,
                actual: 0,
            });
        }
        Ok(())
    }
}

/// Editable category fields submitted by the admin form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub status: RecordStatus,
}

impl CategoryInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, CATEGORY_NAME_MAX_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, CategoryInput};
    use crate::model::{RecordStatus, ValidationError};

    #[test]
    fn new_category_trims_name_and_requires_image() {
        let input = CategoryInput {
            name: "  Birthday  ".to_string(),
            status: RecordStatus::Active,
        };
        let category = Category::new(&input, "");
        assert_eq!(category.name, "Birthday");
        assert!(matches!(
            category.validate(),
            Err(ValidationError::ImageCount { actual: 0, .. })
        ));
    }

    #[test]
    fn blank_name_is_rejected_before_upload() {
        let input = CategoryInput::default();
        assert_eq!(input.validate(), Err(ValidationError::BlankField("name")));
    }
}
