//! Persistence adapter contract.
//!
//! The reconciler and the file pipeline only talk to storage through
//! [`JobStore`]. Every call is synchronous and must see earlier writes made
//! inside the same open transaction.

use thiserror::Error;

use crate::db::DatabaseError;
use crate::mapper::ColumnMap;

pub type JobId = i64;
pub type ItemId = i64;
pub type AgentId = i64;

/// Column names of the `jobs` and `job_items` tables that mapping rules may
/// target.
pub mod columns {
    pub const BU_ID: &str = "bu_id";
    pub const AGENT_ID: &str = "agent_id";
    pub const CARD_REF_NBR: &str = "card_ref_nbr";
    pub const SERVICE_CODE: &str = "service_code";

    pub const CONNOTE_NBR: &str = "connote_nbr";
    pub const ITEM_NBR: &str = "item_nbr";
    pub const EMAIL: &str = "email";
    pub const MOBILE: &str = "mobile";

    pub const JOB_COLUMNS: &[&str] = &[
        BU_ID,
        AGENT_ID,
        CARD_REF_NBR,
        "consumer_name",
        "address1",
        "address2",
        "suburb",
        "postcode",
        "state",
        "status",
        SERVICE_CODE,
    ];

    pub const ITEM_COLUMNS: &[&str] = &[
        CONNOTE_NBR,
        ITEM_NBR,
        "consumer_name",
        EMAIL,
        MOBILE,
        "pieces",
        "status",
    ];
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] DatabaseError),
}

pub trait JobStore {
    /// Jobs whose card reference equals `barcode`, newest first.
    fn find_job_by_barcode(&self, barcode: &str) -> Result<Vec<JobId>, StoreError>;

    /// Jobs owning an item with this connote and item number, newest first.
    fn find_job_by_item_match(
        &self,
        connote: &str,
        item_nbr: &str,
    ) -> Result<Vec<JobId>, StoreError>;

    fn find_item_by_job_and_keys(
        &self,
        job_id: JobId,
        connote: &str,
        item_nbr: &str,
    ) -> Result<Option<ItemId>, StoreError>;

    fn create_job(&self, columns: &ColumnMap) -> Result<JobId, StoreError>;

    fn update_job_agent(&self, job_id: JobId, agent_id: AgentId) -> Result<(), StoreError>;

    /// `columns` must carry nothing for `job_id`; the foreign key is passed
    /// separately.
    fn create_item(&self, job_id: JobId, columns: &ColumnMap) -> Result<ItemId, StoreError>;

    /// Id of an active agent with this code.
    fn agent_exists(&self, agent_code: &str) -> Result<Option<AgentId>, StoreError>;

    fn begin(&self) -> Result<(), StoreError>;
    fn commit(&self) -> Result<(), StoreError>;
    fn rollback(&self) -> Result<(), StoreError>;

    /// Opens the per-record savepoint inside the current transaction.
    fn savepoint(&self) -> Result<(), StoreError>;
    fn release_savepoint(&self) -> Result<(), StoreError>;
    /// Undoes everything since [`JobStore::savepoint`] and closes it.
    fn rollback_to_savepoint(&self) -> Result<(), StoreError>;
}
