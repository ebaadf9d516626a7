//! Back-office use-case services.
//!
//! # Responsibility
//! - Orchestrate image uploads and document writes per collection.
//! - Keep HTTP and other callers decoupled from storage details.
//!
//! # Invariants
//! - Input is validated before any upload starts.
//! - Blobs uploaded by a failed request are removed before the error returns.
//! - Stale blobs are removed only after the document write succeeded.
//! - Listings are ordered here, after a single-field store query.

use crate::media::MediaError;
use crate::model::{DocumentId, ValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod category_service;
pub mod committee_service;
pub mod offer_service;
pub mod order_service;
pub mod product_service;
pub mod uploads;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by every back-office use case.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    Media(MediaError),
    NotFound {
        collection: &'static str,
        id: DocumentId,
    },
    /// A referenced document (e.g. an offer's category) does not exist.
    MissingReference {
        collection: &'static str,
        id: DocumentId,
    },
    Duplicate(String),
    Repo(RepoError),
    /// Write succeeded but read-back disagrees.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Media(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => write!(f, "{collection} not found: {id}"),
            Self::MissingReference { collection, id } => {
                write!(f, "referenced {collection} does not exist: {id}")
            }
            Self::Duplicate(value) => write!(f, "already exists: {value}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Media(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<MediaError> for ServiceError {
    fn from(value: MediaError) -> Self {
        Self::Media(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::Duplicate(value) => Self::Duplicate(value),
            RepoError::NotFound(id) => Self::NotFound {
                collection: "document",
                id,
            },
            other => Self::Repo(other),
        }
    }
}

/// Orders records by `created_at DESC, id ASC`.
pub(crate) fn sort_newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (i64, DocumentId),
{
    items.sort_by(|left, right| {
        let (left_created, left_id) = key(left);
        let (right_created, right_id) = key(right);
        right_created
            .cmp(&left_created)
            .then_with(|| left_id.cmp(&right_id))
    });
}

/// Splits `current` image URLs into (kept, dropped).
///
/// `None` keeps everything. URLs in `keep` that are not in `current` are ignored.
pub(crate) fn split_images(current: &[String], keep: Option<&[String]>) -> (Vec<String>, Vec<String>) {
    match keep {
        None => (current.to_vec(), Vec::new()),
        Some(keep) => current.iter().cloned().partition(|url| keep.contains(url)),
    }
}

#[cfg(test)]
mod tests {
    use super::{sort_newest_first, split_images};
    use uuid::Uuid;

    #[test]
    fn split_images_keeps_all_without_selection() {
        let current = vec!["a".to_string(), "b".to_string()];

        assert_eq!(split_images(&current, None), (current.clone(), Vec::new()));

        let keep = vec!["b".to_string(), "zzz".to_string()];
        assert_eq!(
            split_images(&current, Some(keep.as_slice())),
            (vec!["b".to_string()], vec!["a".to_string()])
        );
        assert_eq!(split_images(&current, Some(&[][..])), (Vec::new(), current));
    }

    #[test]
    fn newest_first_breaks_ties_by_id() {
        let a = Uuid::parse_str("00000000-0000-4000-8000-000000000001").unwrap();
        let b = Uuid::parse_str("00000000-0000-4000-8000-000000000002").unwrap();
        let c = Uuid::parse_str("00000000-0000-4000-8000-000000000003").unwrap();
        let mut items = vec![(100, c), (200, b), (100, a)];

        sort_newest_first(&mut items, |item| *item);

        assert_eq!(items, vec![(200, b), (100, a), (100, c)]);
    }
}
