//! Create-or-update decision for one mapped record.
//!
//! Jobs are found by exact barcode, or, when the barcode looks like a
//! truncated copy of the connote, through the items already stored under
//! the connote and item number.

use thiserror::Error;
use tracing::debug;

use crate::mapper::{column_text, ColumnMap, FieldValue};
use crate::store::{columns, ItemId, JobId, JobStore, StoreError};

/// Connotes longer than this may have been truncated into the barcode field.
const MANUFACTURED_CONNOTE_MIN: usize = 16;
/// Width of the barcode window compared against the connote.
const MANUFACTURED_WINDOW: usize = 16;
/// Barcode offsets the window is taken from.
const MANUFACTURED_OFFSETS: [usize; 2] = [0, 4];
/// Width of the upstream barcode field. Only a barcode filling it can have
/// been cut from a longer connote.
const MANUFACTURED_BARCODE_MIN: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileResult {
    pub action: Action,
    pub job_id: JobId,
    /// `None` when the job was matched through an existing item, whose id is
    /// not looked up again.
    pub item_id: Option<ItemId>,
    pub item_created: bool,
    pub manufactured: bool,
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Unknown agent '{code}'")]
    UnknownAgent { code: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// True when `barcode` is a window of `connote` taken at one of the known
/// truncation offsets. Barcodes shorter than the upstream field width are
/// explicit and never qualify.
pub fn is_manufactured(barcode: &str, connote: &str) -> bool {
    if connote.chars().count() < MANUFACTURED_CONNOTE_MIN {
        return false;
    }
    let chars: Vec<char> = barcode.chars().collect();
    if chars.len() < MANUFACTURED_BARCODE_MIN {
        return false;
    }
    MANUFACTURED_OFFSETS.iter().any(|&offset| {
        let end = (offset + MANUFACTURED_WINDOW).min(chars.len());
        let window: String = chars[offset..end].iter().collect();
        connote.contains(&window)
    })
}

pub struct Reconciler<'a, S: JobStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: JobStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Writes the record's job and item. The job's `agent_id` column carries
    /// the agent code on input and is replaced by the resolved agent id.
    pub fn reconcile(
        &self,
        job: &ColumnMap,
        item: &ColumnMap,
    ) -> Result<ReconcileResult, ReconcileError> {
        let barcode = column_text(job, columns::CARD_REF_NBR).unwrap_or_default();
        let connote = column_text(item, columns::CONNOTE_NBR).unwrap_or_default();
        let item_nbr = column_text(item, columns::ITEM_NBR).unwrap_or_default();

        let agent_code = column_text(job, columns::AGENT_ID).unwrap_or_default();
        let agent_id = match agent_code {
            "" => None,
            code => self.store.agent_exists(code)?,
        }
        .ok_or_else(|| ReconcileError::UnknownAgent {
            code: agent_code.to_string(),
        })?;

        let manufactured = is_manufactured(barcode, connote);
        let existing = if manufactured {
            debug!(barcode, connote, "Barcode looks manufactured, matching by item");
            self.store.find_job_by_item_match(connote, item_nbr)?
        } else {
            self.store.find_job_by_barcode(barcode)?
        };

        if let Some(&job_id) = existing.first() {
            self.store.update_job_agent(job_id, agent_id)?;

            if manufactured {
                return Ok(ReconcileResult {
                    action: Action::Update,
                    job_id,
                    item_id: None,
                    item_created: false,
                    manufactured,
                });
            }

            let (item_id, item_created) =
                match self.store.find_item_by_job_and_keys(job_id, connote, item_nbr)? {
                    Some(item_id) => (item_id, false),
                    None => (self.store.create_item(job_id, item)?, true),
                };
            return Ok(ReconcileResult {
                action: Action::Update,
                job_id,
                item_id: Some(item_id),
                item_created,
                manufactured,
            });
        }

        let mut job = job.clone();
        job.insert(
            columns::AGENT_ID.to_string(),
            FieldValue::text(agent_id.to_string()),
        );
        let job_id = self.store.create_job(&job)?;
        let item_id = self.store.create_item(job_id, item)?;

        Ok(ReconcileResult {
            action: Action::Create,
            job_id,
            item_id: Some(item_id),
            item_created: true,
            manufactured,
        })
    }
}
