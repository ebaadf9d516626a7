//! Category use-case service.
//!
//! # Invariants
//! - Create requires exactly one image.
//! - Update replaces the image only when a new one is uploaded; the previous
//!   blob is removed after the write succeeds.
//! - Delete removes the document first, then its image on a best-effort basis.

use crate::media::{ImageUpload, ObjectStore, DEFAULT_MAX_UPLOAD_BYTES};
use crate::model::category::{Category, CategoryInput};
use crate::model::{require_image_count, DocumentId};
use crate::repo::category_repo::{CategoryListQuery, CategoryRepository};
use crate::service::uploads::{discard_objects, StagedUploads};
use crate::service::{sort_newest_first, ServiceError, ServiceResult};
use log::info;

const CATEGORY_FOLDER: &str = "categories";
const COLLECTION: &str = "category";

/// Category service over a document repository and an object store.
pub struct CategoryService<R: CategoryRepository, S: ObjectStore> {
    repo: R,
    store: S,
    max_upload_bytes: usize,
}

impl<R: CategoryRepository, S: ObjectStore> CategoryService<R, S> {
    pub fn new(repo: R, store: S) -> Self {
        Self {
            repo,
            store,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Lists categories, newest first.
    pub fn list_categories(&self, query: &CategoryListQuery) -> ServiceResult<Vec<Category>> {
        let mut categories = self.repo.list_categories(query)?;
        sort_newest_first(&mut categories, |category| (category.created_at, category.id));
        Ok(categories)
    }

    pub fn get_category(&self, id: DocumentId) -> ServiceResult<Category> {
        self.repo
            .get_category(id)?
            .ok_or(ServiceError::NotFound {
                collection: COLLECTION,
                id,
            })
    }

    /// Uploads the category image and writes the document.
    pub fn create_category(
        &self,
        input: &CategoryInput,
        images: &[ImageUpload],
    ) -> ServiceResult<Category> {
        input.validate()?;
        require_image_count(images.len(), 1, 1)?;

        let mut staged = StagedUploads::new(&self.store, CATEGORY_FOLDER);
        staged.upload_all(images, self.max_upload_bytes)?;

        let image_url = staged.urls().first().cloned().unwrap_or_default();
        let category = Category::new(input, image_url);
        let id = self.repo.create_category(&category)?;
        staged.commit();

        info!("event=category_create module=service status=ok id={id}");
        self.read_back(id, "created category not found in read-back")
    }

    /// Merges form input into an existing category, optionally replacing its image.
    pub fn update_category(
        &self,
        id: DocumentId,
        input: &CategoryInput,
        images: &[ImageUpload],
    ) -> ServiceResult<Category> {
        let current = self.get_category(id)?;
        input.validate()?;
        require_image_count(images.len(), 0, 1)?;

        let mut staged = StagedUploads::new(&self.store, CATEGORY_FOLDER);
        staged.upload_all(images, self.max_upload_bytes)?;

        let mut next = current.clone();
        next.apply(input);
        if let Some(url) = staged.urls().first() {
            next.image_url = url.clone();
        }
        self.repo.update_category(&next)?;
        let replaced = !staged.commit().is_empty();

        if replaced {
            discard_objects(&self.store, &[current.image_url]);
        }
        info!("event=category_update module=service status=ok id={id} image_replaced={replaced}");
        self.read_back(id, "updated category not found in read-back")
    }

    /// Deletes a category and its image. Returns the removed document.
    pub fn delete_category(&self, id: DocumentId) -> ServiceResult<Category> {
        let current = self.get_category(id)?;
        self.repo.delete_category(id)?;
        discard_objects(&self.store, std::slice::from_ref(&current.image_url));

        info!("event=category_delete module=service status=ok id={id}");
        Ok(current)
    }

    fn read_back(&self, id: DocumentId, details: &'static str) -> ServiceResult<Category> {
        self.repo
            .get_category(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
