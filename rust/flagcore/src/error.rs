//! Crate error type
//!
//! Only configuration and catalog loading can fail. DOM races during a scan
//! are not errors; they degrade to "segment skipped".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlagError {
    #[error("failed to parse term catalog: {0}")]
    Catalog(#[source] serde_json::Error),

    #[error("failed to parse platform list: {0}")]
    Platforms(#[source] serde_json::Error),

    #[error("failed to parse user settings: {0}")]
    Settings(#[source] serde_json::Error),

    #[error("failed to parse presentation profiles: {0}")]
    Profiles(#[source] serde_json::Error),

    #[error("invalid document location '{location}': {source}")]
    Location {
        location: String,
        #[source]
        source: url::ParseError,
    },
}

pub type FlagResult<T> = Result<T, FlagError>;
