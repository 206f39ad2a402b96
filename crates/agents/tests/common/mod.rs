//! Common test utilities: scripted model and store

#![allow(dead_code)]

use async_trait::async_trait;
use kgqa_agents::{
    CompletionModel, CompletionRequest, LlmError, QueryAgent, QuerySynthesizer, SynthesizerConfig,
};
use kgqa_core::Ontology;
use kgqa_store::{Connector, GraphStoreClient, ProcedureCall, Session, StoreConfig, StoreError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const MOVIE_ONTOLOGY: &str = r#"
demo:Movie a owl:Class ; rdfs:label "Movie" .
demo:Director a owl:Class ; rdfs:label "Director" .
demo:directedBy a owl:ObjectProperty ; rdfs:domain demo:Movie ; rdfs:range demo:Director .
"#;

pub const NOLAN_QUERY: &str = "SELECT (COUNT(?movie) AS ?count) FROM <kgdocu_movies> WHERE { ?movie demo:directedBy ?d . ?d rdfs:label \"Christopher Nolan\" }";

/// Model that always answers with the same content
pub struct FixedModel {
    content: Result<String, ()>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl FixedModel {
    pub fn answering(content: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            content: Ok(content.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            content: Err(()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn query(sparql: &str) -> Arc<Self> {
        let body = serde_json::json!({
            "sparql_query": sparql,
            "literals": [],
            "triples_with_literals": []
        });
        Self::answering(body.to_string())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionModel for FixedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.content.clone().map_err(|_| LlmError::Api {
            status: 503,
            body: "model unavailable".to_string(),
        })
    }
}

/// Store that answers every call with a scripted result.
///
/// Ontology loads (CONSTRUCT queries) get `ontology`, everything else gets
/// `payload`.
pub struct FakeStore {
    ontology: Result<String, StoreError>,
    payload: Result<String, StoreError>,
    pub queries: Mutex<Vec<String>>,
    pub closes: AtomicUsize,
}

impl FakeStore {
    pub fn new(
        ontology: Result<String, StoreError>,
        payload: Result<String, StoreError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            ontology,
            payload,
            queries: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn serving(payload: &str) -> Arc<Self> {
        Self::new(Ok(MOVIE_ONTOLOGY.to_string()), Ok(payload.to_string()))
    }

    pub fn executed(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

struct FakeConnector(Arc<FakeStore>);

struct FakeSession(Arc<FakeStore>);

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, _config: &StoreConfig) -> kgqa_store::Result<Box<dyn Session>> {
        Ok(Box::new(FakeSession(self.0.clone())))
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn call(&mut self, call: &ProcedureCall) -> kgqa_store::Result<Vec<Option<String>>> {
        let query = call.arg_text(0).unwrap_or_default().to_string();
        self.0.queries.lock().unwrap().push(query.clone());
        let scripted = if query.contains("CONSTRUCT") {
            &self.0.ontology
        } else {
            &self.0.payload
        };
        let payload = scripted.clone()?;
        Ok(vec![Some(query), None, Some(payload), None])
    }

    async fn close(&mut self) {
        self.0.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn store_client(store: &Arc<FakeStore>) -> GraphStoreClient {
    GraphStoreClient::new(StoreConfig::default(), Arc::new(FakeConnector(store.clone())))
}

/// Agent with the movie ontology preloaded
pub fn agent(model: Arc<FixedModel>, store: &Arc<FakeStore>) -> QueryAgent {
    let synthesizer = QuerySynthesizer::new(model, SynthesizerConfig::default());
    QueryAgent::new(
        synthesizer,
        store_client(store),
        Arc::new(Ontology::new(MOVIE_ONTOLOGY)),
    )
}
