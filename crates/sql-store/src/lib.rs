//! Relational store access for the hybrid analyst.
//!
//! The executor is deliberately forgiving: query errors come back as data
//! ([`ExecutionResult`] with `success = false`), while only opening the store can fail.

mod error;
mod executor;

pub use error::{Result, SqlStoreError};
pub use executor::{schema_hint, QueryExecutor, SqliteExecutor, DEFAULT_ROW_LIMIT};

pub use analyst_protocol::ExecutionResult;
