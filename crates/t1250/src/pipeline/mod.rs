//! File loader: one transaction per file, one savepoint per record.

pub mod config;
pub mod context;
pub mod error;
pub mod report;
pub mod runner;

pub use config::{CancelFlag, RunOptions};
pub use context::RecordContext;
pub use error::{Alert, AlertReport, PipelineError, RecordError};
pub use report::{AbortReason, FileOutcome, FileReport};
pub use runner::{Pipeline, TERMINATOR};
