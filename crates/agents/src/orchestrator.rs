//! Request Orchestrator - runs one question through the whole pipeline

use crate::{AgentError, OntologyLoader, QuerySynthesizer, Synthesis, UNSUPPORTED_LANGUAGE_MESSAGE};
use kgqa_core::{normalize, Ontology, SynthesisResult, TabularResult};
use kgqa_store::GraphStoreClient;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Synthesizing,
    Executing,
    Normalizing,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Synthesizing => "synthesizing",
            Self::Executing => "executing",
            Self::Normalizing => "normalizing",
        };
        f.write_str(name)
    }
}

/// How a request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "stage")]
pub enum ResponseStatus {
    Success,
    /// Query ran, no rows came back
    Empty,
    /// Model declined the question's language
    Unsupported,
    Failed(PipelineStage),
}

/// Everything the caller needs to render one answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub question: String,
    pub synthesis: Option<SynthesisResult>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// `None` only on a non-empty success
    pub message: Option<String>,
    pub status: ResponseStatus,
}

impl QueryResponse {
    fn new(question: &str) -> Self {
        Self {
            question: question.to_string(),
            synthesis: None,
            columns: Vec::new(),
            rows: Vec::new(),
            message: None,
            status: ResponseStatus::Success,
        }
    }

    pub fn sparql_query(&self) -> Option<&str> {
        self.synthesis.as_ref().map(|s| s.sparql_query.as_str())
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ResponseStatus::Success | ResponseStatus::Empty)
    }

    fn failed(mut self, error: AgentError) -> Self {
        warn!("Request failed while {}: {}", error.stage(), error);
        self.status = ResponseStatus::Failed(error.stage());
        self.message = Some(error.user_message());
        self
    }

    fn unsupported(mut self) -> Self {
        self.status = ResponseStatus::Unsupported;
        self.message = Some(UNSUPPORTED_LANGUAGE_MESSAGE.to_string());
        self
    }

    fn completed(mut self, table: TabularResult) -> Self {
        self.columns = table.columns;
        self.rows = table.rows;
        if self.rows.is_empty() {
            self.status = ResponseStatus::Empty;
            self.message = Some(format!("No records found for query: {}", self.question));
        }
        self
    }
}

/// Answers questions: synthesize, execute, normalize.
///
/// Cheap to clone; clones share the ontology and both clients.
#[derive(Clone)]
pub struct QueryAgent {
    synthesizer: QuerySynthesizer,
    store: GraphStoreClient,
    ontology: Arc<Ontology>,
}

impl QueryAgent {
    pub fn new(synthesizer: QuerySynthesizer, store: GraphStoreClient, ontology: Arc<Ontology>) -> Self {
        Self {
            synthesizer,
            store,
            ontology,
        }
    }

    /// Load the ontology through `store` and build the agent around it
    pub async fn bootstrap(
        synthesizer: QuerySynthesizer,
        store: GraphStoreClient,
        loader: &OntologyLoader,
    ) -> Self {
        let ontology = loader.load(&store).await;
        Self::new(synthesizer, store, Arc::new(ontology))
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    /// Answer one question. Never fails: every error ends up in `message`.
    #[instrument(skip(self))]
    pub async fn handle(&self, question: &str) -> QueryResponse {
        let response = QueryResponse::new(question);
        info!("Handling question");

        let synthesis = match self.synthesizer.synthesize(question, &self.ontology).await {
            Ok(Synthesis::Query(synthesis)) => synthesis,
            Ok(Synthesis::Unsupported) => return response.unsupported(),
            Err(e) => return response.failed(e.into()),
        };

        let query = synthesis.sparql_query.clone();
        let response = QueryResponse {
            synthesis: Some(synthesis),
            ..response
        };
        self.run(response, &query).await
    }

    /// Execute a caller-written query with the same error mapping as [`handle`](Self::handle)
    #[instrument(skip(self))]
    pub async fn execute_raw(&self, query: &str) -> QueryResponse {
        let response = QueryResponse {
            synthesis: Some(SynthesisResult::new(query)),
            ..QueryResponse::new(query)
        };
        self.run(response, query).await
    }

    async fn run(&self, response: QueryResponse, query: &str) -> QueryResponse {
        let payload = match self.store.execute(query).await {
            Ok(payload) => payload,
            Err(e) => return response.failed(e.into()),
        };

        match normalize(&payload) {
            Ok(table) => {
                info!("{} rows, {} columns", table.row_count(), table.column_count());
                response.completed(table)
            }
            Err(e) => response.failed(e.into()),
        }
    }
}
