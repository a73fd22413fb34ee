//! CLI support for selector-lang
//!
//! Provides programmatic access to the `sel` command so it can be embedded in
//! other tools.

mod query;

pub use query::{QueryOptions, QueryResult, execute_query};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Parse(#[from] crate::ParseError),

    #[error("{0}")]
    Eval(#[from] crate::EvalError),

    #[error(transparent)]
    Format(#[from] crate::format::FormatError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
