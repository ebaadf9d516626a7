//! Committee use-case service.
//!
//! Committees take an optional single image and list by display order.

use crate::media::{ImageUpload, ObjectStore, DEFAULT_MAX_UPLOAD_BYTES};
use crate::model::committee::{Committee, CommitteeInput};
use crate::model::{require_image_count, DocumentId};
use crate::repo::committee_repo::CommitteeRepository;
use crate::service::uploads::{discard_objects, StagedUploads};
use crate::service::{ServiceError, ServiceResult};
use log::info;

const COMMITTEE_FOLDER: &str = "committees";

pub struct CommitteeService<R: CommitteeRepository, S: ObjectStore> {
    repo: R,
    store: S,
    max_upload_bytes: usize,
}

impl<R: CommitteeRepository, S: ObjectStore> CommitteeService<R, S> {
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

    /// Lists committees by `order ASC, name ASC`.
    pub fn list_committees(&self) -> ServiceResult<Vec<Committee>> {
        let mut committees = self.repo.list_committees()?;
        committees.sort_by(|left, right| {
            left.order
                .cmp(&right.order)
                .then_with(|| left.name.to_lowercase().cmp(&right.name.to_lowercase()))
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(committees)
    }

    pub fn get_committee(&self, id: DocumentId) -> ServiceResult<Committee> {
        self.repo.get_committee(id)?.ok_or(ServiceError::NotFound {
            collection: "committee",
            id,
        })
    }

    pub fn create_committee(
        &self,
        input: &CommitteeInput,
        images: &[ImageUpload],
    ) -> ServiceResult<Committee> {
        input.validate()?;
        require_image_count(images.len(), 0, 1)?;

        let mut staged = StagedUploads::new(&self.store, COMMITTEE_FOLDER);
        staged.upload_all(images, self.max_upload_bytes)?;

        let committee = Committee::new(input, staged.urls().first().cloned());
        let id = self.repo.create_committee(&committee)?;
        staged.commit();

        info!("event=committee_create module=service status=ok id={id}");
        self.read_back(id, "created committee not found in read-back")
    }

    pub fn update_committee(
        &self,
        id: DocumentId,
        input: &CommitteeInput,
        images: &[ImageUpload],
    ) -> ServiceResult<Committee> {
        let current = self.get_committee(id)?;
        input.validate()?;
        require_image_count(images.len(), 0, 1)?;

        let mut staged = StagedUploads::new(&self.store, COMMITTEE_FOLDER);
        staged.upload_all(images, self.max_upload_bytes)?;

        let mut next = current.clone();
        next.apply(input);
        if let Some(url) = staged.urls().first() {
            next.image_url = Some(url.clone());
        }
        self.repo.update_committee(&next)?;
        let replaced = !staged.commit().is_empty();

        if replaced {
            if let Some(previous) = current.image_url {
                discard_objects(&self.store, &[previous]);
            }
        }
        info!("event=committee_update module=service status=ok id={id} image_replaced={replaced}");
        self.read_back(id, "updated committee not found in read-back")
    }

    pub fn delete_committee(&self, id: DocumentId) -> ServiceResult<Committee> {
        let current = self.get_committee(id)?;
        self.repo.delete_committee(id)?;
        if let Some(image_url) = &current.image_url {
            discard_objects(&self.store, std::slice::from_ref(image_url));
        }

        info!("event=committee_delete module=service status=ok id={id}");
        Ok(current)
    }

    fn read_back(&self, id: DocumentId, details: &'static str) -> ServiceResult<Committee> {
        self.repo
            .get_committee(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
