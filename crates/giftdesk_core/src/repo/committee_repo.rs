//! Committee collection.
//!
//! The `order` field is stored as `display_order` since `ORDER` is reserved.

use super::{query_collection, read_id, RepoError, RepoResult};
use crate::model::committee::Committee;
use crate::model::DocumentId;
use rusqlite::{params, Connection, Row};

const COMMITTEE_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    image_url,
    display_order,
    activity,
    created_at,
    updated_at
FROM committees";

/// Repository interface for the committee collection.
pub trait CommitteeRepository {
    fn create_committee(&self, committee: &Committee) -> RepoResult<DocumentId>;
    fn update_committee(&self, committee: &Committee) -> RepoResult<()>;
    fn get_committee(&self, id: DocumentId) -> RepoResult<Option<Committee>>;
    fn list_committees(&self) -> RepoResult<Vec<Committee>>;
    fn delete_committee(&self, id: DocumentId) -> RepoResult<()>;
}

/// SQLite-backed committee collection.
pub struct SqliteCommitteeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommitteeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CommitteeRepository for SqliteCommitteeRepository<'_> {
    fn create_committee(&self, committee: &Committee) -> RepoResult<DocumentId> {
        committee.validate()?;

        self.conn.execute(
            "INSERT INTO committees (id, name, description, image_url, display_order, activity)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                committee.id.to_string(),
                committee.name.as_str(),
                committee.description.as_str(),
                committee.image_url.as_deref(),
                committee.order,
                committee.activity.as_str(),
            ],
        )?;

        Ok(committee.id)
    }

    fn update_committee(&self, committee: &Committee) -> RepoResult<()> {
        committee.validate()?;

        let changed = self.conn.execute(
            "UPDATE committees
             SET
                name = ?1,
                description = ?2,
                image_url = ?3,
                display_order = ?4,
                activity = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?6;",
            params![
                committee.name.as_str(),
                committee.description.as_str(),
                committee.image_url.as_deref(),
                committee.order,
                committee.activity.as_str(),
                committee.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(committee.id));
        }
        Ok(())
    }

    fn get_committee(&self, id: DocumentId) -> RepoResult<Option<Committee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMITTEE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_committee_row(row)?));
        }
        Ok(None)
    }

    fn list_committees(&self) -> RepoResult<Vec<Committee>> {
        query_collection(self.conn, COMMITTEE_SELECT_SQL, None, parse_committee_row)
    }

    fn delete_committee(&self, id: DocumentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM committees WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_committee_row(row: &Row<'_>) -> RepoResult<Committee> {
    let committee = Committee {
        id: read_id(row, "id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        image_url: row.get("image_url")?,
        order: row.get("display_order")?,
        activity: row.get("activity")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    committee.validate()?;
    Ok(committee)
}
