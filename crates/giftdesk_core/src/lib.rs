//! Core domain logic for the GiftDesk back office.
//! Models, storage, media handling, authorization, and use-case services.

pub mod auth;
pub mod db;
pub mod logging;
pub mod media;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::{authorize, bearer_token, AuthError, IdentityProvider, Permission, StaticTokenIdentity};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use media::{FsObjectStore, ImageUpload, MediaError, ObjectStore, DEFAULT_MAX_UPLOAD_BYTES};
pub use model::{DocumentId, RecordStatus, ValidationError};
pub use repo::{RepoError, RepoResult};
pub use service::category_service::CategoryService;
pub use service::committee_service::CommitteeService;
pub use service::offer_service::OfferService;
pub use service::order_service::OrderCatalog;
pub use service::product_service::ProductService;
pub use service::user_service::UserService;
pub use service::{ServiceError, ServiceResult};

/// Liveness probe used by the health route.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
