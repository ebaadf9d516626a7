//! Staged image uploads with rollback on drop.
//!
//! A `StagedUploads` behaves like a store transaction for blobs: objects put
//! through it are deleted when it is dropped without `commit()`.

use crate::media::{ImageUpload, ObjectStore};
use crate::service::ServiceResult;
use log::{info, warn};

/// Uploads staged for one document write.
pub struct StagedUploads<'s, S: ObjectStore> {
    store: &'s S,
    folder: &'static str,
    urls: Vec<String>,
    committed: bool,
}

impl<'s, S: ObjectStore> StagedUploads<'s, S> {
    pub fn new(store: &'s S, folder: &'static str) -> Self {
        Self {
            store,
            folder,
            urls: Vec::new(),
            committed: false,
        }
    }

    /// Validates every upload, then stores them one at a time.
    ///
    /// Stops at the first failing upload; objects stored before it stay staged
    /// and are removed when `self` is dropped.
    pub fn upload_all(&mut self, uploads: &[ImageUpload], max_bytes: usize) -> ServiceResult<()> {
        for upload in uploads {
            upload.validate(max_bytes)?;
        }
        for upload in uploads {
            let stored = self.store.put(self.folder, upload)?;
            self.urls.push(stored.url);
        }
        Ok(())
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Keeps the staged objects and returns their URLs.
    pub fn commit(mut self) -> Vec<String> {
        self.committed = true;
        std::mem::take(&mut self.urls)
    }
}

impl<S: ObjectStore> Drop for StagedUploads<'_, S> {
    fn drop(&mut self) {
        if self.committed || self.urls.is_empty() {
            return;
        }
        info!(
            "event=uploads_rollback module=service status=start folder={} count={}",
            self.folder,
            self.urls.len()
        );
        discard_objects(self.store, &self.urls);
    }
}

/// Deletes objects by URL, logging and ignoring individual failures.
pub fn discard_objects<S: ObjectStore + ?Sized>(store: &S, urls: &[String]) {
    for url in urls {
        if let Err(err) = store.delete(url) {
            warn!("event=object_discard module=service status=error url={url} error={err}");
        }
    }
}
