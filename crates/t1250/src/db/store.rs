//! [`JobStore`] over the SQLite repositories.

use super::{agent_repo, item_repo, job_repo, now_timestamp, Database, DatabaseError};
use crate::mapper::ColumnMap;
use crate::store::{AgentId, ItemId, JobId, JobStore, StoreError};

/// Name of the per-record savepoint.
const RECORD_SAVEPOINT: &str = "record";

#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        log::trace!("{}", sql);
        self.db
            .with_conn(|conn| conn.execute_batch(sql).map_err(DatabaseError::from))?;
        Ok(())
    }
}

impl JobStore for SqliteStore {
    fn find_job_by_barcode(&self, barcode: &str) -> Result<Vec<JobId>, StoreError> {
        Ok(job_repo::find_ids_by_barcode(&self.db, barcode)?)
    }

    fn find_job_by_item_match(
        &self,
        connote: &str,
        item_nbr: &str,
    ) -> Result<Vec<JobId>, StoreError> {
        Ok(job_repo::find_ids_by_item_match(&self.db, connote, item_nbr)?)
    }

    fn find_item_by_job_and_keys(
        &self,
        job_id: JobId,
        connote: &str,
        item_nbr: &str,
    ) -> Result<Option<ItemId>, StoreError> {
        Ok(item_repo::find_id_by_job_and_keys(
            &self.db, job_id, connote, item_nbr,
        )?)
    }

    fn create_job(&self, columns: &ColumnMap) -> Result<JobId, StoreError> {
        let id = job_repo::insert(&self.db, columns, &now_timestamp())?;
        log::debug!("Created job {}", id);
        Ok(id)
    }

    fn update_job_agent(&self, job_id: JobId, agent_id: AgentId) -> Result<(), StoreError> {
        job_repo::update_agent(&self.db, job_id, agent_id, &now_timestamp())?;
        log::debug!("Job {} reassigned to agent {}", job_id, agent_id);
        Ok(())
    }

    fn create_item(&self, job_id: JobId, columns: &ColumnMap) -> Result<ItemId, StoreError> {
        let id = item_repo::insert(&self.db, job_id, columns, &now_timestamp())?;
        log::debug!("Created item {} on job {}", id, job_id);
        Ok(id)
    }

    fn agent_exists(&self, agent_code: &str) -> Result<Option<AgentId>, StoreError> {
        Ok(agent_repo::find_active_id(&self.db, agent_code)?)
    }

    fn begin(&self) -> Result<(), StoreError> {
        self.execute_batch("BEGIN IMMEDIATE")
    }

    fn commit(&self) -> Result<(), StoreError> {
        self.execute_batch("COMMIT")
    }

    fn rollback(&self) -> Result<(), StoreError> {
        self.execute_batch("ROLLBACK")
    }

    fn savepoint(&self) -> Result<(), StoreError> {
        self.execute_batch(&format!("SAVEPOINT {}", RECORD_SAVEPOINT))
    }

    fn release_savepoint(&self) -> Result<(), StoreError> {
        self.execute_batch(&format!("RELEASE SAVEPOINT {}", RECORD_SAVEPOINT))
    }

    fn rollback_to_savepoint(&self) -> Result<(), StoreError> {
        self.execute_batch(&format!(
            "ROLLBACK TO SAVEPOINT {0}; RELEASE SAVEPOINT {0}",
            RECORD_SAVEPOINT
        ))
    }
}
