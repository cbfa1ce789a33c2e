//! Reads delivery-point reference data, plus the upsert
//! used when seeding it.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRow {
    pub id: i64,
    pub code: String,
    pub name: Option<String>,
    pub active: bool,
}

impl AgentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            code: row.get("code")?,
            name: row.get("name")?,
            active: row.get::<_, i64>("active")? != 0,
        })
    }
}

/// Inserts an agent or refreshes the name and active flag of an existing
/// code. Returns the agent id.
pub fn upsert(
    db: &Database,
    code: &str,
    name: Option<&str>,
    active: bool,
) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO agents (code, name, active) VALUES (?1, ?2, ?3)
             ON CONFLICT(code) DO UPDATE SET name = excluded.name, active = excluded.active",
            params![code, name, active as i64],
        )?;
        let id = conn.query_row(
            "SELECT id FROM agents WHERE code = ?1",
            params![code],
            |r| r.get(0),
        )?;
        Ok(id)
    })
}

pub fn find_by_code(db: &Database, code: &str) -> Result<Option<AgentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM agents WHERE code = ?1",
                params![code],
                AgentRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Id of the active agent with this code.
pub fn find_active_id(db: &Database, code: &str) -> Result<Option<i64>, DatabaseError> {
    db.with_conn(|conn| {
        let id = conn
            .query_row(
                "SELECT id FROM agents WHERE code = ?1 AND active = 1",
                params![code],
                |r| r.get(0),
            )
            .optional()?;
        Ok(id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    #[test]
    fn test_upsert_and_find() {
        let db = test_db();
        let id = upsert(&db, "A123", Some("Cairns Depot"), true).unwrap();

        let agent = find_by_code(&db, "A123").unwrap().unwrap();
        assert_eq!(agent.id, id);
        assert_eq!(agent.name.as_deref(), Some("Cairns Depot"));
        assert!(agent.active);
    }

    #[test]
    fn test_upsert_keeps_id() {
        let db = test_db();
        let first = upsert(&db, "A123", Some("Old"), true).unwrap();
        let second = upsert(&db, "A123", Some("New"), false).unwrap();
        assert_eq!(first, second);

        let agent = find_by_code(&db, "A123").unwrap().unwrap();
        assert_eq!(agent.name.as_deref(), Some("New"));
        assert!(!agent.active);
    }

    #[test]
    fn test_find_active_id_ignores_inactive() {
        let db = test_db();
        let id = upsert(&db, "A1", None, true).unwrap();
        upsert(&db, "A2", None, false).unwrap();

        assert_eq!(find_active_id(&db, "A1").unwrap(), Some(id));
        assert_eq!(find_active_id(&db, "A2").unwrap(), None);
        assert_eq!(find_active_id(&db, "A3").unwrap(), None);
    }
}
