//! Operations on the `job_items` table.

use rusqlite::{params, OptionalExtension, Row, ToSql};

use super::{insert_columns, Database, DatabaseError};
use crate::mapper::ColumnMap;
use crate::store::columns::ITEM_COLUMNS;

#[derive(Debug, Clone)]
pub struct ItemRow {
    pub id: i64,
    pub job_id: i64,
    pub connote_nbr: String,
    pub item_nbr: String,
    pub consumer_name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub pieces: Option<i64>,
    pub status: i64,
    pub created_at: String,
}

impl ItemRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            job_id: row.get("job_id")?,
            connote_nbr: row.get("connote_nbr")?,
            item_nbr: row.get("item_nbr")?,
            consumer_name: row.get("consumer_name")?,
            email: row.get("email")?,
            mobile: row.get("mobile")?,
            pieces: row.get("pieces")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Inserts an item under `job_id`. Returns the new item id.
pub fn insert(
    db: &Database,
    job_id: i64,
    columns: &ColumnMap,
    now: &str,
) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        insert_columns(
            conn,
            "job_items",
            ITEM_COLUMNS,
            columns,
            &[("job_id", &job_id as &dyn ToSql), ("created_at", &now)],
        )
    })
}

pub fn find_id_by_job_and_keys(
    db: &Database,
    job_id: i64,
    connote: &str,
    item_nbr: &str,
) -> Result<Option<i64>, DatabaseError> {
    db.with_conn(|conn| {
        let id = conn
            .query_row(
                "SELECT id FROM job_items
                 WHERE job_id = ?1 AND connote_nbr = ?2 AND item_nbr = ?3",
                params![job_id, connote, item_nbr],
                |r| r.get(0),
            )
            .optional()?;
        Ok(id)
    })
}

pub fn find_by_id(db: &Database, id: i64) -> Result<Option<ItemRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM job_items WHERE id = ?1",
                params![id],
                ItemRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Items of a job in insertion order.
pub fn list_by_job(db: &Database, job_id: i64) -> Result<Vec<ItemRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM job_items WHERE job_id = ?1 ORDER BY id")?;
        let rows = stmt
            .query_map(params![job_id], ItemRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM job_items", [], |r| r.get(0))?)
    })
}
