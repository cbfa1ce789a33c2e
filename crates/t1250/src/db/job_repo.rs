//! Operations on the `jobs` table.

use rusqlite::{params, OptionalExtension, Row, ToSql};

use super::{insert_columns, Database, DatabaseError};
use crate::mapper::ColumnMap;
use crate::store::columns::JOB_COLUMNS;

/// A raw job row from the database.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: i64,
    pub bu_id: Option<i64>,
    pub agent_id: Option<i64>,
    pub card_ref_nbr: Option<String>,
    pub consumer_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub suburb: Option<String>,
    pub postcode: Option<String>,
    pub state: Option<String>,
    pub status: i64,
    pub service_code: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            bu_id: row.get("bu_id")?,
            agent_id: row.get("agent_id")?,
            card_ref_nbr: row.get("card_ref_nbr")?,
            consumer_name: row.get("consumer_name")?,
            address1: row.get("address1")?,
            address2: row.get("address2")?,
            suburb: row.get("suburb")?,
            postcode: row.get("postcode")?,
            state: row.get("state")?,
            status: row.get("status")?,
            service_code: row.get("service_code")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Inserts a job from mapped columns. Returns the new job id.
pub fn insert(db: &Database, columns: &ColumnMap, now: &str) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        insert_columns(
            conn,
            "jobs",
            JOB_COLUMNS,
            columns,
            &[("created_at", &now as &dyn ToSql), ("updated_at", &now)],
        )
    })
}

pub fn find_by_id(db: &Database, id: i64) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM jobs WHERE id = ?1",
                params![id],
                JobRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Job ids with this card reference, newest first.
pub fn find_ids_by_barcode(db: &Database, barcode: &str) -> Result<Vec<i64>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id FROM jobs WHERE card_ref_nbr = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let ids = stmt
            .query_map(params![barcode], |r| r.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    })
}

/// Ids of jobs owning an item with this connote and item number, newest
/// job first.
pub fn find_ids_by_item_match(
    db: &Database,
    connote: &str,
    item_nbr: &str,
) -> Result<Vec<i64>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT j.id, j.created_at FROM job_items i
             JOIN jobs j ON j.id = i.job_id
             WHERE i.connote_nbr = ?1 AND i.item_nbr = ?2
             ORDER BY j.created_at DESC, j.id DESC",
        )?;
        let ids = stmt
            .query_map(params![connote, item_nbr], |r| r.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    })
}

/// Reassigns a job to another agent.
pub fn update_agent(
    db: &Database,
    id: i64,
    agent_id: i64,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE jobs SET agent_id = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, agent_id, updated_at],
        )?;
        Ok(())
    })
}

pub fn count_by_barcode(db: &Database, barcode: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE card_ref_nbr = ?1",
            params![barcode],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM jobs", [], |r| r.get(0))?))
}
