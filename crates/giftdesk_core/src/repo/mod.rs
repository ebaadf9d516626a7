//! Document collections over SQLite.
//!
//! # Responsibility
//! - Define one repository contract per collection.
//! - Keep SQL and column encoding inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call the record's `validate()` before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - List queries filter on at most one field; ordering is applied by the
//!   service layer after fetch.
//! - `updated_at` is refreshed by the store on every update.

use crate::db::DbError;
use crate::model::{DocumentId, RecordStatus, ValidationError};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod category_repo;
pub mod committee_repo;
pub mod offer_repo;
pub mod product_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every collection.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound(DocumentId),
    /// Unique constraint rejected the write; carries the offending value.
    Duplicate(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "document not found: {id}"),
            Self::Duplicate(value) => write!(f, "duplicate value: {value}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Duplicate(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps unique-constraint failures to `Duplicate`, everything else to `Db`.
pub(crate) fn map_write_error(err: rusqlite::Error, value: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepoError::Duplicate(value.to_string())
        }
        _ => err.into(),
    }
}

pub(crate) fn read_id(row: &Row<'_>, column: &str) -> RepoResult<DocumentId> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid id `{text}` in column {column}")))
}

pub(crate) fn read_status(row: &Row<'_>) -> RepoResult<RecordStatus> {
    let text: String = row.get("status")?;
    RecordStatus::parse(&text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid status `{text}`")))
}

pub(crate) fn read_list(row: &Row<'_>, column: &str) -> RepoResult<Vec<String>> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text).map_err(|err| {
        RepoError::InvalidData(format!("invalid list in column {column}: {err}"))
    })
}

pub(crate) fn encode_list(values: &[String]) -> RepoResult<String> {
    serde_json::to_string(values)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode list: {err}")))
}

/// Runs a collection scan with at most one equality filter.
///
/// `column` always comes from code, never from request input.
pub(crate) fn query_collection<T>(
    conn: &Connection,
    select_sql: &str,
    filter: Option<(&'static str, Value)>,
    parse: fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut sql = select_sql.to_string();
    let mut bind_values: Vec<Value> = Vec::new();
    if let Some((column, value)) = filter {
        sql.push_str(&format!(" WHERE {column} = ?1"));
        bind_values.push(value);
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }
    Ok(items)
}
