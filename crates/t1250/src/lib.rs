pub mod config;
pub mod db;
pub mod error;
pub mod mapper;
pub mod notify;
pub mod parser;
pub mod pipeline;
pub mod postcode;
pub mod reconciler;
pub mod store;

pub use config::{load_config, Config, ConditionMap, Profile};
pub use db::{Database, DatabaseError, SqliteStore};
pub use error::{ConfigError, Result, T1250Error};
pub use mapper::{ColumnMap, FieldValue, Mapper, MappingError};
pub use notify::{decide, CommsQueue, FlagDirQueue, MemoryQueue, PendingComms, QueueError};
pub use pipeline::{CancelFlag, FileOutcome, FileReport, Pipeline, PipelineError, RunOptions};
pub use reconciler::{ReconcileError, ReconcileResult, Reconciler};
pub use store::{JobStore, StoreError};
