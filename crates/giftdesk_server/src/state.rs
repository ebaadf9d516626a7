use std::sync::{Arc, Mutex};

use giftdesk_core::model::user::User;
use giftdesk_core::repo::user_repo::SqliteUserRepository;
use giftdesk_core::{
    authorize, open_db, FsObjectStore, IdentityProvider, OrderCatalog, Permission,
    StaticTokenIdentity, UserService,
};
use log::info;
use rusqlite::Connection;

use crate::config::Config;
use crate::error::AppError;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    db: Mutex<Connection>,
    pub store: FsObjectStore,
    pub identity: Arc<dyn IdentityProvider + Send + Sync>,
    pub orders: OrderCatalog,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        conn: Connection,
        store: FsObjectStore,
        identity: Arc<dyn IdentityProvider + Send + Sync>,
        max_upload_bytes: usize,
    ) -> SharedState {
        Arc::new(Self {
            db: Mutex::new(conn),
            store,
            identity,
            orders: OrderCatalog::sample(),
            max_upload_bytes,
        })
    }

    /// Opens the database and media directory named by `config`.
    pub fn from_config(config: &Config) -> Result<SharedState, AppError> {
        let conn = open_db(&config.db_path)
            .map_err(|e| AppError::Internal(format!("failed to open database: {e}")))?;
        let store = FsObjectStore::open(&config.media_dir, &config.media_base_url)
            .map_err(|e| AppError::Internal(format!("failed to open media store: {e}")))?;
        let identity = StaticTokenIdentity::from_pairs(&config.session_tokens);
        info!(
            "event=state_init module=server status=ok sessions={} media_dir={}",
            identity.len(),
            config.media_dir.display()
        );

        if let Some((name, email)) = &config.bootstrap_admin {
            let admin = UserService::new(SqliteUserRepository::new(&conn)).ensure_admin(name, email)?;
            info!(
                "event=bootstrap_admin module=server status=ok id={} role={}",
                admin.id,
                admin.role.as_str()
            );
        }

        Ok(Self::new(
            conn,
            store,
            Arc::new(identity),
            config.max_upload_bytes,
        ))
    }

    fn lock_db(&self) -> Result<std::sync::MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }
}

/// Checks that the session behind `token` holds `permission`.
///
/// Handlers call this before reading the path or body.
pub async fn require_session(
    state: &SharedState,
    token: Option<String>,
    permission: Permission,
) -> Result<User, AppError> {
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || {
        let conn = state.lock_db()?;
        Ok(authorize(
            state.identity.as_ref(),
            &SqliteUserRepository::new(&conn),
            token.as_deref(),
            permission,
        )?)
    })
    .await?
}

/// Runs `work` on the blocking pool with the store connection.
pub async fn with_store<T, F>(state: &SharedState, work: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&Connection, &AppState) -> Result<T, AppError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || {
        let conn = state.lock_db()?;
        work(&conn, &state)
    })
    .await?
}
