//! Product use-case service.
//!
//! # Invariants
//! - A product always ends a write with 2..=4 images.
//! - On update, `keep_images` selects which current images survive; URLs not
//!   already on the product are ignored and `None` keeps them all. New uploads
//!   are appended after them.
//! - Images dropped by an update are removed after the write succeeds.

use crate::media::{ImageUpload, ObjectStore, DEFAULT_MAX_UPLOAD_BYTES};
use crate::model::product::{Product, ProductInput, PRODUCT_MAX_IMAGES, PRODUCT_MIN_IMAGES};
use crate::model::{require_image_count, DocumentId};
use crate::repo::product_repo::{ProductListQuery, ProductRepository};
use crate::service::uploads::{discard_objects, StagedUploads};
use crate::service::{sort_newest_first, split_images, ServiceError, ServiceResult};
use log::info;

const PRODUCT_FOLDER: &str = "products";

/// Product service over a document repository and an object store.
pub struct ProductService<R: ProductRepository, S: ObjectStore> {
    repo: R,
    store: S,
    max_upload_bytes: usize,
}

impl<R: ProductRepository, S: ObjectStore> ProductService<R, S> {
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

    pub fn list_products(&self, query: &ProductListQuery) -> ServiceResult<Vec<Product>> {
        let mut products = self.repo.list_products(query)?;
        sort_newest_first(&mut products, |product| (product.created_at, product.id));
        Ok(products)
    }

    pub fn get_product(&self, id: DocumentId) -> ServiceResult<Product> {
        self.repo.get_product(id)?.ok_or(ServiceError::NotFound {
            collection: "product",
            id,
        })
    }

    pub fn create_product(
        &self,
        input: &ProductInput,
        images: &[ImageUpload],
    ) -> ServiceResult<Product> {
        input.validate()?;
        require_image_count(images.len(), PRODUCT_MIN_IMAGES, PRODUCT_MAX_IMAGES)?;

        let mut staged = StagedUploads::new(&self.store, PRODUCT_FOLDER);
        staged.upload_all(images, self.max_upload_bytes)?;

        let product = Product::new(input, staged.urls().to_vec());
        let id = self.repo.create_product(&product)?;
        staged.commit();

        info!(
            "event=product_create module=service status=ok id={id} images={}",
            product.images.len()
        );
        self.read_back(id, "created product not found in read-back")
    }

    pub fn update_product(
        &self,
        id: DocumentId,
        input: &ProductInput,
        keep_images: Option<&[String]>,
        new_images: &[ImageUpload],
    ) -> ServiceResult<Product> {
        let current = self.get_product(id)?;
        input.validate()?;

        let (kept, dropped) = split_images(&current.images, keep_images);
        require_image_count(
            kept.len() + new_images.len(),
            PRODUCT_MIN_IMAGES,
            PRODUCT_MAX_IMAGES,
        )?;

        let mut staged = StagedUploads::new(&self.store, PRODUCT_FOLDER);
        staged.upload_all(new_images, self.max_upload_bytes)?;

        let mut next = current;
        next.apply(input);
        next.images = kept.into_iter().chain(staged.urls().iter().cloned()).collect();
        self.repo.update_product(&next)?;
        staged.commit();

        discard_objects(&self.store, &dropped);
        info!(
            "event=product_update module=service status=ok id={id} images={} dropped={}",
            next.images.len(),
            dropped.len()
        );
        self.read_back(id, "updated product not found in read-back")
    }

    pub fn delete_product(&self, id: DocumentId) -> ServiceResult<Product> {
        let current = self.get_product(id)?;
        self.repo.delete_product(id)?;
        discard_objects(&self.store, &current.images);

        info!("event=product_delete module=service status=ok id={id}");
        Ok(current)
    }

    fn read_back(&self, id: DocumentId, details: &'static str) -> ServiceResult<Product> {
        self.repo
            .get_product(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
