//! Offer use-case service.
//!
//! # Invariants
//! - `category_id` must name a stored category on create and update.
//! - An offer ends every write with at most 3 images.
//! - Image merge semantics match the product service.

use crate::media::{ImageUpload, ObjectStore, DEFAULT_MAX_UPLOAD_BYTES};
use crate::model::offer::{Offer, OfferInput, OFFER_MAX_IMAGES};
use crate::model::{require_image_count, DocumentId};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::offer_repo::{OfferListQuery, OfferRepository};
use crate::service::uploads::{discard_objects, StagedUploads};
use crate::service::{sort_newest_first, split_images, ServiceError, ServiceResult};
use log::info;

const OFFER_FOLDER: &str = "offers";

/// Offer service over offer/category repositories and an object store.
pub struct OfferService<R: OfferRepository, C: CategoryRepository, S: ObjectStore> {
    repo: R,
    categories: C,
    store: S,
    max_upload_bytes: usize,
}

impl<R: OfferRepository, C: CategoryRepository, S: ObjectStore> OfferService<R, C, S> {
    pub fn new(repo: R, categories: C, store: S) -> Self {
        Self {
            repo,
            categories,
            store,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn list_offers(&self, query: &OfferListQuery) -> ServiceResult<Vec<Offer>> {
        let mut offers = self.repo.list_offers(query)?;
        sort_newest_first(&mut offers, |offer| (offer.created_at, offer.id));
        Ok(offers)
    }

    pub fn get_offer(&self, id: DocumentId) -> ServiceResult<Offer> {
        self.repo.get_offer(id)?.ok_or(ServiceError::NotFound {
            collection: "offer",
            id,
        })
    }

    pub fn create_offer(&self, input: &OfferInput, images: &[ImageUpload]) -> ServiceResult<Offer> {
        input.validate()?;
        self.ensure_category(input.category_id)?;
        require_image_count(images.len(), 0, OFFER_MAX_IMAGES)?;

        let mut staged = StagedUploads::new(&self.store, OFFER_FOLDER);
        staged.upload_all(images, self.max_upload_bytes)?;

        let offer = Offer::new(input, staged.urls().to_vec());
        let id = self.repo.create_offer(&offer)?;
        staged.commit();

        info!(
            "event=offer_create module=service status=ok id={id} category_id={}",
            offer.category_id
        );
        self.read_back(id, "created offer not found in read-back")
    }

    pub fn update_offer(
        &self,
        id: DocumentId,
        input: &OfferInput,
        keep_images: Option<&[String]>,
        new_images: &[ImageUpload],
    ) -> ServiceResult<Offer> {
        let current = self.get_offer(id)?;
        input.validate()?;
        self.ensure_category(input.category_id)?;

        let (kept, dropped) = split_images(&current.images, keep_images);
        require_image_count(kept.len() + new_images.len(), 0, OFFER_MAX_IMAGES)?;

        let mut staged = StagedUploads::new(&self.store, OFFER_FOLDER);
        staged.upload_all(new_images, self.max_upload_bytes)?;

        let mut next = current;
        next.apply(input);
        next.images = kept.into_iter().chain(staged.urls().iter().cloned()).collect();
        self.repo.update_offer(&next)?;
        staged.commit();

        discard_objects(&self.store, &dropped);
        info!(
            "event=offer_update module=service status=ok id={id} dropped={}",
            dropped.len()
        );
        self.read_back(id, "updated offer not found in read-back")
    }

    pub fn delete_offer(&self, id: DocumentId) -> ServiceResult<Offer> {
        let current = self.get_offer(id)?;
        self.repo.delete_offer(id)?;
        discard_objects(&self.store, &current.images);

        info!("event=offer_delete module=service status=ok id={id}");
        Ok(current)
    }

    fn ensure_category(&self, category_id: DocumentId) -> ServiceResult<()> {
        if self.categories.get_category(category_id)?.is_none() {
            return Err(ServiceError::MissingReference {
                collection: "category",
                id: category_id,
            });
        }
        Ok(())
    }

    fn read_back(&self, id: DocumentId, details: &'static str) -> ServiceResult<Offer> {
        self.repo
            .get_offer(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
