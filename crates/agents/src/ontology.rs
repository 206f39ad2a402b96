//! Ontology Loader - fetches the ontology context once at startup

use kgqa_core::sparql::{ontology_construct_query, DEFAULT_ONTOLOGY_GRAPH};
use kgqa_core::Ontology;
use kgqa_store::GraphStoreClient;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct OntologyLoader {
    graph: String,
}

impl OntologyLoader {
    pub fn new(graph: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
        }
    }

    /// Graph name from `KGQA_ONTOLOGY_GRAPH`
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("KGQA_ONTOLOGY_GRAPH")
                .unwrap_or_else(|_| DEFAULT_ONTOLOGY_GRAPH.to_string()),
        )
    }

    pub fn query(&self) -> String {
        ontology_construct_query(&self.graph)
    }

    /// Never fails: a store error becomes the text of a degraded ontology and
    /// later requests run against it.
    #[instrument(skip(self, store), fields(graph = %self.graph))]
    pub async fn load(&self, store: &GraphStoreClient) -> Ontology {
        match store.execute(&self.query()).await {
            Ok(text) => {
                info!("Loaded ontology ({} bytes)", text.len());
                Ontology::new(text)
            }
            Err(e) => {
                warn!("Ontology load failed, continuing degraded: {}", e);
                Ontology::degraded(e.to_string())
            }
        }
    }
}

impl Default for OntologyLoader {
    fn default() -> Self {
        Self::new(DEFAULT_ONTOLOGY_GRAPH)
    }
}
