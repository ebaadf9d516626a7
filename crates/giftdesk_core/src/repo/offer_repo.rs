//! Offer collection.
//!
//! `category_id` is a plain column; referential checks live in the offer
//! service so that category deletes stay single-document writes.

use super::{
    encode_list, query_collection, read_id, read_list, read_status, RepoError, RepoResult,
};
use crate::model::offer::{DiscountType, Offer};
use crate::model::{DocumentId, RecordStatus};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const OFFER_SELECT_SQL: &str = "SELECT
    id,
    category_id,
    discount_type,
    label,
    value,
    images,
    status,
    created_at,
    updated_at
FROM offers";

/// Single-field filter for offer listing.
///
/// When both fields are set, `category_id` is queried and `status` is applied
/// after fetch.
#[derive(Debug, Clone, Default)]
pub struct OfferListQuery {
    pub category_id: Option<DocumentId>,
    pub status: Option<RecordStatus>,
}

/// Repository interface for the offer collection.
pub trait OfferRepository {
    fn create_offer(&self, offer: &Offer) -> RepoResult<DocumentId>;
    fn update_offer(&self, offer: &Offer) -> RepoResult<()>;
    fn get_offer(&self, id: DocumentId) -> RepoResult<Option<Offer>>;
    fn list_offers(&self, query: &OfferListQuery) -> RepoResult<Vec<Offer>>;
    fn delete_offer(&self, id: DocumentId) -> RepoResult<()>;
}

/// SQLite-backed offer collection.
pub struct SqliteOfferRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOfferRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl OfferRepository for SqliteOfferRepository<'_> {
    fn create_offer(&self, offer: &Offer) -> RepoResult<DocumentId> {
        offer.validate()?;

        self.conn.execute(
            "INSERT INTO offers (
                id,
                category_id,
                discount_type,
                label,
                value,
                images,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                offer.id.to_string(),
                offer.category_id.to_string(),
                offer.discount_type.as_str(),
                offer.label.as_str(),
                offer.value,
                encode_list(&offer.images)?,
                offer.status.as_str(),
            ],
        )?;

        Ok(offer.id)
    }

    fn update_offer(&self, offer: &Offer) -> RepoResult<()> {
        offer.validate()?;

        let changed = self.conn.execute(
            "UPDATE offers
             SET
                category_id = ?1,
                discount_type = ?2,
                label = ?3,
                value = ?4,
                images = ?5,
                status = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?7;",
            params![
                offer.category_id.to_string(),
                offer.discount_type.as_str(),
                offer.label.as_str(),
                offer.value,
                encode_list(&offer.images)?,
                offer.status.as_str(),
                offer.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(offer.id));
        }
        Ok(())
    }

    fn get_offer(&self, id: DocumentId) -> RepoResult<Option<Offer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{OFFER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_offer_row(row)?));
        }
        Ok(None)
    }

    fn list_offers(&self, query: &OfferListQuery) -> RepoResult<Vec<Offer>> {
        let filter = match (query.category_id, query.status) {
            (Some(category_id), _) => Some(("category_id", Value::Text(category_id.to_string()))),
            (None, Some(status)) => Some(("status", Value::Text(status.as_str().to_string()))),
            (None, None) => None,
        };

        let mut offers = query_collection(self.conn, OFFER_SELECT_SQL, filter, parse_offer_row)?;
        if let (Some(_), Some(status)) = (query.category_id, query.status) {
            offers.retain(|offer| offer.status == status);
        }
        Ok(offers)
    }

    fn delete_offer(&self, id: DocumentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM offers WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_offer_row(row: &Row<'_>) -> RepoResult<Offer> {
    let type_text: String = row.get("discount_type")?;
    let discount_type = DiscountType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid discount type `{type_text}` in offers.discount_type"
        ))
    })?;

    let offer = Offer {
        id: read_id(row, "id")?,
        category_id: read_id(row, "category_id")?,
        discount_type,
        label: row.get("label")?,
        value: row.get("value")?,
        images: read_list(row, "images")?,
        status: read_status(row)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    offer.validate()?;
    Ok(offer)
}
