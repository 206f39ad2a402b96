//! Agent error types

use crate::orchestrator::PipelineStage;
use kgqa_core::CoreError;
use kgqa_store::StoreError;
use thiserror::Error;

/// Language-model call failures
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model returned no content")]
    EmptyResponse,

    #[error("Unexpected model response ({source}): {body}")]
    InvalidResponse {
        source: serde_json::Error,
        body: serde_json::Value,
    },
}

/// The model did not yield a usable query.
///
/// Kept apart from store failures so the orchestrator can report them
/// differently.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Language model call failed: {0}")]
    Completion(#[from] LlmError),

    #[error("Model output is not valid JSON: {source}")]
    InvalidJson {
        source: serde_json::Error,
        content: String,
    },

    #[error("Model output does not match the expected query format: {source}")]
    InvalidStructure {
        source: serde_json::Error,
        content: String,
    },

    #[error("Model returned an empty sparql_query")]
    EmptyQuery,
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid result payload: {0}")]
    Normalize(#[from] CoreError),
}

impl AgentError {
    /// Stage of the pipeline this error belongs to
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Synthesis(_) => PipelineStage::Synthesizing,
            Self::Store(_) => PipelineStage::Executing,
            Self::Normalize(_) => PipelineStage::Normalizing,
        }
    }

    /// Text shown to the user. Store errors already read
    /// `Error executing SPARQL query: ...`; everything else gets `Error: `.
    pub fn user_message(&self) -> String {
        match self {
            Self::Store(e) => e.to_string(),
            other => format!("Error: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
