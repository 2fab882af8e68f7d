use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SqlStoreError>;

#[derive(Error, Debug)]
pub enum SqlStoreError {
    #[error("Cannot open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection lock poisoned")]
    Poisoned,
}
