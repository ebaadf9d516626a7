//! User collection.
//!
//! # Invariants
//! - `email` is unique; duplicates surface as `RepoError::Duplicate`.
//! - Lookups by email expect the normalized (lowercase) form.

use super::{map_write_error, query_collection, read_id, RepoError, RepoResult};
use crate::model::user::{Role, User};
use crate::model::DocumentId;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    role,
    created_at,
    updated_at
FROM users";

#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub role: Option<Role>,
}

/// Repository interface for the user collection.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<DocumentId>;
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: DocumentId) -> RepoResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>>;
    fn delete_user(&self, id: DocumentId) -> RepoResult<()>;
}

/// SQLite-backed user collection.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn find_one(&self, column: &'static str, value: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE {column} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<DocumentId> {
        user.validate()?;

        self.conn
            .execute(
                "INSERT INTO users (id, name, email, role) VALUES (?1, ?2, ?3, ?4);",
                params![
                    user.id.to_string(),
                    user.name.as_str(),
                    user.email.as_str(),
                    user.role.as_str(),
                ],
            )
            .map_err(|err| map_write_error(err, &user.email))?;

        Ok(user.id)
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET
                    name = ?1,
                    email = ?2,
                    role = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?4;",
                params![
                    user.name.as_str(),
                    user.email.as_str(),
                    user.role.as_str(),
                    user.id.to_string(),
                ],
            )
            .map_err(|err| map_write_error(err, &user.email))?;

        if changed == 0 {
            return Err(RepoError::NotFound(user.id));
        }
        Ok(())
    }

    fn get_user(&self, id: DocumentId) -> RepoResult<Option<User>> {
        self.find_one("id", &id.to_string())
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.find_one("email", email)
    }

    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        let filter = query
            .role
            .map(|role| ("role", Value::Text(role.as_str().to_string())));
        query_collection(self.conn, USER_SELECT_SQL, filter, parse_user_row)
    }

    fn delete_user(&self, id: DocumentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let role_text: String = row.get("role")?;
    let role = Role::parse(&role_text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid role `{role_text}` in users.role")))?;

    let user = User {
        id: read_id(row, "id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        role,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    user.validate()?;
    Ok(user)
}
