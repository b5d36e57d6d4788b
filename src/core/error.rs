use crate::core::lifecycle::ContractStatus;
use rusqlite;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CountersignError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: ContractStatus,
        to: ContractStatus,
    },
    #[error("Not found: {0}")]
    NotFound(String),
}
