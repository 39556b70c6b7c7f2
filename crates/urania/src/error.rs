use std::path::PathBuf;

use thiserror::Error;

use crate::ephemeris::{CelestialBody, ProviderError};

/// Errors surfaced by the engine.
#[derive(Error, Debug)]
pub enum AstroError {
    #[error("Invalid {what}: {value}")]
    InvalidInput { what: &'static str, value: String },
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("Chart is incomplete, missing bodies: {missing:?}")]
    IncompleteChart { missing: Vec<CelestialBody> },
    #[error("A birth chart already exists for '{identity}' and overwrite was not requested")]
    PersistenceConflict { identity: String },
    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AstroError {
    pub(crate) fn invalid(what: &'static str, value: impl ToString) -> Self {
        AstroError::InvalidInput {
            what,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AstroError>;
