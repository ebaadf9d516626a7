//! Category collection.

use super::{query_collection, read_id, read_status, RepoError, RepoResult};
use crate::model::category::Category;
use crate::model::{DocumentId, RecordStatus};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT
    id,
    name,
    image_url,
    status,
    created_at,
    updated_at
FROM categories";

/// Single-field filter for category listing.
#[derive(Debug, Clone, Default)]
pub struct CategoryListQuery {
    pub status: Option<RecordStatus>,
}

/// Repository interface for the category collection.
pub trait CategoryRepository {
    fn create_category(&self, category: &Category) -> RepoResult<DocumentId>;
    fn update_category(&self, category: &Category) -> RepoResult<()>;
    fn get_category(&self, id: DocumentId) -> RepoResult<Option<Category>>;
    fn list_categories(&self, query: &CategoryListQuery) -> RepoResult<Vec<Category>>;
    fn delete_category(&self, id: DocumentId) -> RepoResult<()>;
}

/// SQLite-backed category collection.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, category: &Category) -> RepoResult<DocumentId> {
        category.validate()?;

        self.conn.execute(
            "INSERT INTO categories (id, name, image_url, status)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                category.id.to_string(),
                category.name.as_str(),
                category.image_url.as_str(),
                category.status.as_str(),
            ],
        )?;

        Ok(category.id)
    }

    fn update_category(&self, category: &Category) -> RepoResult<()> {
        category.validate()?;

        let changed = self.conn.execute(
            "UPDATE categories
             SET
                name = ?1,
                image_url = ?2,
                status = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![
                category.name.as_str(),
                category.image_url.as_str(),
                category.status.as_str(),
                category.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(category.id));
        }
        Ok(())
    }

    fn get_category(&self, id: DocumentId) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_category_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_categories(&self, query: &CategoryListQuery) -> RepoResult<Vec<Category>> {
        let filter = query
            .status
            .map(|status| ("status", Value::Text(status.as_str().to_string())));
        query_collection(self.conn, CATEGORY_SELECT_SQL, filter, parse_category_row)
    }

    fn delete_category(&self, id: DocumentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let category = Category {
        id: read_id(row, "id")?,
        name: row.get("name")?,
        image_url: row.get("image_url")?,
        status: read_status(row)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    category.validate()?;
    Ok(category)
}
