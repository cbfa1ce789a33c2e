use std::fmt;

use uuid::Uuid;

use super::error::AlertReport;
use crate::notify::PendingComms;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    DryRun,
    MissingTerminator,
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::DryRun => f.write_str("dry run"),
            AbortReason::MissingTerminator => f.write_str("missing %%EOF terminator"),
            AbortReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Committed,
    RolledBack(AbortReason),
}

impl FileOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, FileOutcome::Committed)
    }
}

#[derive(Debug)]
pub struct FileReport {
    pub run_id: Uuid,
    pub outcome: FileOutcome,
    pub records_read: usize,
    pub jobs_created: usize,
    pub jobs_updated: usize,
    pub items_created: usize,
    /// Markers decided for the file. Handed to the queue only on commit.
    pub markers: Vec<PendingComms>,
    pub alerts: AlertReport,
}

impl FileReport {
    pub fn new(run_id: Uuid, source: &str) -> Self {
        Self {
            run_id,
            outcome: FileOutcome::RolledBack(AbortReason::MissingTerminator),
            records_read: 0,
            jobs_created: 0,
            jobs_updated: 0,
            items_created: 0,
            markers: Vec::new(),
            alerts: AlertReport::new(source),
        }
    }
}
