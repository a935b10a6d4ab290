use std::path::PathBuf;

use generational_arena::Index;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("tree capacity exhausted: no room for another node (capacity {capacity})")]
    CapacityExhausted { capacity: usize },

    #[error("invariant violated at node {node:?}: {reason}")]
    InvariantViolation { node: Index, reason: String },
}

pub type TreeResult<T> = Result<T, TreeError>;

/// Errors raised while loading layered settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: String, reason: String },
}

pub type SettingsResult<T> = Result<T, SettingsError>;
