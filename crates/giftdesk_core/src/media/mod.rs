//! Object storage for uploaded images.
//!
//! # Responsibility
//! - Define the object store contract used by catalog services.
//! - Validate uploaded image payloads before they reach storage.
//!
//! # Invariants
//! - Object keys are generated by the store, never taken verbatim from input.
//! - A stored object is addressed externally only by its public URL.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod fs_store;

pub use fs_store::FsObjectStore;

pub type MediaResult<T> = Result<T, MediaError>;

/// Default upper bound for one uploaded image.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// One image file received from an admin form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Checks content type and size bounds.
    pub fn validate(&self, max_bytes: usize) -> MediaResult<()> {
        if !self
            .content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
        {
            return Err(MediaError::UnsupportedContentType(
                self.content_type.clone(),
            ));
        }
        if self.bytes.is_empty() {
            return Err(MediaError::EmptyUpload(self.file_name.clone()));
        }
        if self.bytes.len() > max_bytes {
            return Err(MediaError::TooLarge {
                file_name: self.file_name.clone(),
                max_bytes,
            });
        }
        Ok(())
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// Bytes of a stored object plus its inferred content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Object storage contract.
pub trait ObjectStore {
    /// Stores one upload under `folder` and returns its key and public URL.
    fn put(&self, folder: &str, upload: &ImageUpload) -> MediaResult<StoredObject>;

    /// Deletes the object addressed by a public URL previously returned by `put`.
    fn delete(&self, url: &str) -> MediaResult<()>;

    /// Reads the object stored under `key`.
    fn get(&self, key: &str) -> MediaResult<ObjectBody>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn put(&self, folder: &str, upload: &ImageUpload) -> MediaResult<StoredObject> {
        (**self).put(folder, upload)
    }

    fn delete(&self, url: &str) -> MediaResult<()> {
        (**self).delete(url)
    }

    fn get(&self, key: &str) -> MediaResult<ObjectBody> {
        (**self).get(key)
    }
}

/// Object storage errors.
#[derive(Debug)]
pub enum MediaError {
    UnsupportedContentType(String),
    EmptyUpload(String),
    TooLarge { file_name: String, max_bytes: usize },
    /// URL is not served by this store, or key escapes the store root.
    ForeignObject(String),
    NotFound(String),
    Io(std::io::Error),
}

impl Display for MediaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedContentType(value) => {
                write!(f, "unsupported content type `{value}`; expected image/*")
            }
            Self::EmptyUpload(name) => write!(f, "uploaded file `{name}` is empty"),
            Self::TooLarge {
                file_name,
                max_bytes,
            } => write!(f, "uploaded file `{file_name}` exceeds {max_bytes} bytes"),
            Self::ForeignObject(value) => write!(f, "object is not owned by this store: {value}"),
            Self::NotFound(key) => write!(f, "object not found: {key}"),
            Self::Io(err) => write!(f, "object store io error: {err}"),
        }
    }
}

impl Error for MediaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MediaError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl MediaError {
    /// Whether the failure was caused by the uploaded payload itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedContentType(_) | Self::EmptyUpload(_) | Self::TooLarge { .. }
        )
    }
}
