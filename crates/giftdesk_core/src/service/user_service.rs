//! Back-office user management.
//!
//! # Invariants
//! - Emails are unique after normalization; conflicts surface as `Duplicate`.
//! - `ensure_admin` never demotes or renames an existing user.

use crate::model::user::{normalize_email, Role, User, UserInput};
use crate::model::DocumentId;
use crate::repo::user_repo::{UserListQuery, UserRepository};
use crate::service::{sort_newest_first, ServiceError, ServiceResult};
use log::{info, warn};

pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_users(&self, query: &UserListQuery) -> ServiceResult<Vec<User>> {
        let mut users = self.repo.list_users(query)?;
        sort_newest_first(&mut users, |user| (user.created_at, user.id));
        Ok(users)
    }

    pub fn get_user(&self, id: DocumentId) -> ServiceResult<User> {
        self.repo.get_user(id)?.ok_or(ServiceError::NotFound {
            collection: "user",
            id,
        })
    }

    pub fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        Ok(self.repo.find_user_by_email(&normalize_email(email))?)
    }

    pub fn create_user(&self, input: &UserInput) -> ServiceResult<User> {
        input.validate()?;
        let user = User::new(input);
        if self.repo.find_user_by_email(&user.email)?.is_some() {
            return Err(ServiceError::Duplicate(user.email));
        }

        let id = self.repo.create_user(&user)?;
        info!(
            "event=user_create module=service status=ok id={id} role={}",
            user.role.as_str()
        );
        self.read_back(id, "created user not found in read-back")
    }

    pub fn update_user(&self, id: DocumentId, input: &UserInput) -> ServiceResult<User> {
        let mut user = self.get_user(id)?;
        input.validate()?;
        user.apply(input);

        if let Some(existing) = self.repo.find_user_by_email(&user.email)? {
            if existing.id != id {
                return Err(ServiceError::Duplicate(user.email));
            }
        }

        self.repo.update_user(&user)?;
        info!(
            "event=user_update module=service status=ok id={id} role={}",
            user.role.as_str()
        );
        self.read_back(id, "updated user not found in read-back")
    }

    pub fn delete_user(&self, id: DocumentId) -> ServiceResult<User> {
        let current = self.get_user(id)?;
        self.repo.delete_user(id)?;
        info!("event=user_delete module=service status=ok id={id}");
        Ok(current)
    }

    /// Makes sure a bootstrap admin exists for `email`.
    ///
    /// Creates the user with `Role::Admin` when missing. An existing user is
    /// returned unchanged, whatever its role.
    pub fn ensure_admin(&self, name: &str, email: &str) -> ServiceResult<User> {
        if let Some(existing) = self.find_by_email(email)? {
            if existing.role != Role::Admin {
                warn!(
                    "event=bootstrap_admin module=service status=skipped id={} role={}",
                    existing.id,
                    existing.role.as_str()
                );
            }
            return Ok(existing);
        }

        self.create_user(&UserInput {
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Admin,
        })
    }

    fn read_back(&self, id: DocumentId, details: &'static str) -> ServiceResult<User> {
        self.repo
            .get_user(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
