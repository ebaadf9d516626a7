//! Product collection.
//!
//! List fields (`images`, `available_offers`, `highlights`) are stored as JSON
//! arrays in TEXT columns.

use super::{
    encode_list, query_collection, read_id, read_list, read_status, RepoError, RepoResult,
};
use crate::model::product::Product;
use crate::model::{DocumentId, RecordStatus};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const PRODUCT_SELECT_SQL: &str = "SELECT
    id,
    name,
    amount,
    discount,
    images,
    available_offers,
    highlights,
    status,
    created_at,
    updated_at
FROM products";

#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    pub status: Option<RecordStatus>,
}

/// Repository interface for the product collection.
pub trait ProductRepository {
    fn create_product(&self, product: &Product) -> RepoResult<DocumentId>;
    fn update_product(&self, product: &Product) -> RepoResult<()>;
    fn get_product(&self, id: DocumentId) -> RepoResult<Option<Product>>;
    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>>;
    fn delete_product(&self, id: DocumentId) -> RepoResult<()>;
}

/// SQLite-backed product collection.
pub struct SqliteProductRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProductRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn create_product(&self, product: &Product) -> RepoResult<DocumentId> {
        product.validate()?;

        self.conn.execute(
            "INSERT INTO products (
                id,
                name,
                amount,
                discount,
                images,
                available_offers,
                highlights,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                product.id.to_string(),
                product.name.as_str(),
                product.amount,
                product.discount,
                encode_list(&product.images)?,
                encode_list(&product.available_offers)?,
                encode_list(&product.highlights)?,
                product.status.as_str(),
            ],
        )?;

        Ok(product.id)
    }

    fn update_product(&self, product: &Product) -> RepoResult<()> {
        product.validate()?;

        let changed = self.conn.execute(
            "UPDATE products
             SET
                name = ?1,
                amount = ?2,
                discount = ?3,
                images = ?4,
                available_offers = ?5,
                highlights = ?6,
                status = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?8;",
            params![
                product.name.as_str(),
                product.amount,
                product.discount,
                encode_list(&product.images)?,
                encode_list(&product.available_offers)?,
                encode_list(&product.highlights)?,
                product.status.as_str(),
                product.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(product.id));
        }
        Ok(())
    }

    fn get_product(&self, id: DocumentId) -> RepoResult<Option<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }
        Ok(None)
    }

    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>> {
        let filter = query
            .status
            .map(|status| ("status", Value::Text(status.as_str().to_string())));
        query_collection(self.conn, PRODUCT_SELECT_SQL, filter, parse_product_row)
    }

    fn delete_product(&self, id: DocumentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let discount = row.get::<_, i64>("discount")?;
    let discount = u8::try_from(discount).map_err(|_| {
        RepoError::InvalidData(format!("invalid discount `{discount}` in products.discount"))
    })?;

    let product = Product {
        id: read_id(row, "id")?,
        name: row.get("name")?,
        amount: row.get("amount")?,
        discount,
        images: read_list(row, "images")?,
        available_offers: read_list(row, "available_offers")?,
        highlights: read_list(row, "highlights")?,
        status: read_status(row)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    product.validate()?;
    Ok(product)
}
