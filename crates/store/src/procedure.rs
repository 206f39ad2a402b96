//! The stored-procedure interface of the graph store

use crate::{Result, StoreConfig};
use async_trait::async_trait;

/// Procedure that runs a SPARQL query and writes the result to its third argument
pub const SPARQL_EXECUTE: &str = "SYS.SPARQL_EXECUTE";

/// Request/response headers passed to [`SPARQL_EXECUTE`]; asks for CSV results
pub const RESULT_FORMAT_HEADERS: &str =
    "Accept: application/sparql-results+csv\r\nContent-Type: application/sparql-query";

/// Position of the result payload in the procedure's returned values
pub const PAYLOAD_POSITION: usize = 2;

/// One positional argument of a procedure call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcedureArg {
    Text(String),
    /// Placeholder the procedure fills in
    Output,
    Null,
}

impl ProcedureArg {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureCall {
    pub name: String,
    pub args: Vec<ProcedureArg>,
}

impl ProcedureCall {
    /// `SYS.SPARQL_EXECUTE(query, headers, ?, NULL)`
    pub fn sparql_execute(query: impl Into<String>) -> Self {
        Self {
            name: SPARQL_EXECUTE.to_string(),
            args: vec![
                ProcedureArg::Text(query.into()),
                ProcedureArg::Text(RESULT_FORMAT_HEADERS.to_string()),
                ProcedureArg::Output,
                ProcedureArg::Null,
            ],
        }
    }

    pub fn arg_text(&self, position: usize) -> Option<&str> {
        self.args.get(position).and_then(ProcedureArg::as_text)
    }
}

/// Opens sessions against the store
#[async_trait]
pub trait Connector: Send + Sync {
    /// Failures are reported as [`crate::StoreError::Connect`]
    async fn connect(&self, config: &StoreConfig) -> Result<Box<dyn Session>>;
}

/// An open connection. Callers must `close` it once done, on every path.
#[async_trait]
pub trait Session: Send {
    /// Invoke a procedure; returns one value per argument position
    async fn call(&mut self, call: &ProcedureCall) -> Result<Vec<Option<String>>>;

    async fn close(&mut self);
}
