use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::mapper::MappingError;
use crate::notify::QueueError;
use crate::reconciler::ReconcileError;
use crate::store::StoreError;

/// Failures that stop a whole file.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Transaction failed: {0}")]
    Transaction(#[source] StoreError),

    #[error("Failed to read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures that reject a single record.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("{0}")]
    Mapping(#[from] MappingError),

    #[error("Record belongs to business unit id {found}, file is {business_unit} ({expected})")]
    BusinessUnitMismatch {
        business_unit: String,
        expected: i64,
        found: String,
    },

    #[error("{0}")]
    Reconcile(#[from] ReconcileError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Queueing notification failed: {0}")]
    Queue(#[from] QueueError),
}

#[derive(Debug)]
pub struct Alert {
    pub line: usize,
    /// Connote of the rejected record, when it could be read.
    pub reference: String,
    pub error: RecordError,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reference.is_empty() {
            write!(f, "line {}: {}", self.line, self.error)
        } else {
            write!(f, "line {} [{}]: {}", self.line, self.reference, self.error)
        }
    }
}

/// Every record-level failure of one file, reported together.
#[derive(Debug, Default)]
pub struct AlertReport {
    pub source: String,
    pub alerts: Vec<Alert>,
}

impl AlertReport {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            alerts: Vec::new(),
        }
    }

    pub fn push(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }
}

impl fmt::Display for AlertReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} record(s) rejected in {}",
            self.alerts.len(),
            self.source
        )?;
        for alert in &self.alerts {
            write!(f, "\n  {}", alert)?;
        }
        Ok(())
    }
}
