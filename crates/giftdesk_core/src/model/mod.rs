//! Back-office domain model.
//!
//! # Responsibility
//! - Define the flat records mirrored 1:1 onto document collections.
//! - Own form-level validation rules shared by every write path.
//!
//! # Invariants
//! - Every stored record is identified by a stable `DocumentId`.
//! - `created_at`/`updated_at` are assigned by the store, never by callers.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod category;
pub mod committee;
pub mod offer;
pub mod order;
pub mod product;
pub mod user;

/// Stable identifier for every stored document.
pub type DocumentId = Uuid;

/// Publication state shared by catalog records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Form-level validation failure for any record.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field is blank after trim.
    BlankField(&'static str),
    /// Text field exceeds its character budget.
    TooLong { field: &'static str, max_chars: usize },
    /// Numeric field is outside its accepted range.
    OutOfRange {
        field: &'static str,
        expected: &'static str,
    },
    /// Number of attached images is outside the accepted bounds.
    ImageCount {
        min: usize,
        max: usize,
        actual: usize,
    },
    /// Email address does not have a `local@domain.tld` shape.
    InvalidEmail(String),
    /// Too many entries in a list field.
    TooManyEntries { field: &'static str, max: usize },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} is required"),
            Self::TooLong { field, max_chars } => {
                write!(f, "{field} must be at most {max_chars} characters")
            }
            Self::OutOfRange { field, expected } => write!(f, "{field} must be {expected}"),
            Self::ImageCount { min, max, actual } if min == max => {
                write!(f, "exactly {min} image(s) required, got {actual}")
            }
            Self::ImageCount { min, max, actual } => {
                write!(f, "between {min} and {max} images required, got {actual}")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::TooManyEntries { field, max } => {
                write!(f, "{field} accepts at most {max} entries")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    require_max_chars(field, value, max_chars)
}

pub(crate) fn require_max_chars(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(())
}

pub(crate) fn require_image_count(
    actual: usize,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    if actual < min || actual > max {
        return Err(ValidationError::ImageCount { min, max, actual });
    }
    Ok(())
}

/// Trims list entries and drops blank ones, keeping input order.
pub fn normalize_entries<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|entry| entry.as_ref().trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}
