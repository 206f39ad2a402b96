//! Store error types

use thiserror::Error;

/// Failures of a store call. Every variant renders as
/// `Error executing SPARQL query: ...`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Error executing SPARQL query: connection failed: {0}")]
    Connect(String),

    #[error("Error executing SPARQL query: {0}")]
    Procedure(String),

    #[error("Error executing SPARQL query: procedure returned no value at position {0}")]
    MissingOutput(usize),

    #[error("Error executing SPARQL query: query is empty")]
    EmptyQuery,
}

pub type Result<T> = std::result::Result<T, StoreError>;
