use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum T1250Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Queue error: {0}")]
    Queue(#[from] crate::notify::QueueError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid field '{name}': {reason}")]
    InvalidField { name: String, reason: String },

    #[error("Invalid mapping rule for column '{column}': {reason}")]
    InvalidRule { column: String, reason: String },

    #[error("Unknown business unit '{0}'")]
    UnknownBusinessUnit(String),
}

pub type Result<T> = std::result::Result<T, T1250Error>;
