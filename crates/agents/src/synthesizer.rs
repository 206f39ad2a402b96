//! Query Synthesizer - turns a question into SPARQL grounded in the ontology

use crate::{ChatMessage, CompletionModel, CompletionRequest, SynthesisError};
use kgqa_core::sparql::DEFAULT_DATA_GRAPH;
use kgqa_core::{Ontology, SynthesisResult};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const DEFAULT_MODEL: &str = "gpt-4o";

/// Sentence the model answers with when it cannot handle the question's language
pub const UNSUPPORTED_LANGUAGE_MESSAGE: &str =
    "Please enter your question in a prominent language such as English, Spanish, German, or French.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizerConfig {
    /// Model identifier sent with every completion
    pub model: String,
    /// Named graph every generated query must use
    pub graph_name: String,
}

impl SynthesizerConfig {
    /// Read `LLM_MODEL` and `KGQA_GRAPH_NAME`
    pub fn from_env() -> Self {
        Self {
            model: std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            graph_name: std::env::var("KGQA_GRAPH_NAME")
                .unwrap_or_else(|_| DEFAULT_DATA_GRAPH.to_string()),
        }
    }
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            graph_name: DEFAULT_DATA_GRAPH.to_string(),
        }
    }
}

/// What the model produced for one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    Query(SynthesisResult),
    /// The model declined because of the question's language
    Unsupported,
}

#[derive(Clone)]
pub struct QuerySynthesizer {
    model: Arc<dyn CompletionModel>,
    config: SynthesizerConfig,
}

impl QuerySynthesizer {
    pub fn new(model: Arc<dyn CompletionModel>, config: SynthesizerConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Ask the model for a query answering `question`.
    ///
    /// Model-call failures and malformed output are returned as errors, not
    /// swallowed; the refusal sentence yields [`Synthesis::Unsupported`].
    #[instrument(skip(self, ontology))]
    pub async fn synthesize(
        &self,
        question: &str,
        ontology: &Ontology,
    ) -> Result<Synthesis, SynthesisError> {
        let request = self.build_request(question, ontology);
        let content = self.model.complete(&request).await?;
        debug!("Model output: {}", content);

        let synthesis = parse_synthesis(&content)?;
        match &synthesis {
            Synthesis::Query(result) => info!("Synthesized query: {}", result.sparql_query),
            Synthesis::Unsupported => info!("Model declined: unsupported language"),
        }
        Ok(synthesis)
    }

    pub fn build_request(&self, question: &str, ontology: &Ontology) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt(ontology)),
                ChatMessage::user(question),
            ],
            json_mode: true,
            temperature: 0.0,
        }
    }

    fn system_prompt(&self, ontology: &Ontology) -> String {
        format!(
            r#"You are an intelligent SPARQL assistant. Your task is to:
- Understand the user's question in any language.
- If the language is not supported or not recognized, respond only with this message:
"{refusal}"
- If supported, generate a SPARQL query using the ontology provided below.
- The graph is directed: properties go from domain to range.
- Always enclose literals in double quotes.
- If `rdfs:label` exists for any class or entity, always retrieve the label using an OPTIONAL clause.
- Return your response strictly as valid JSON in the format below.

JSON Response Format:
{{
    "sparql_query": "SPARQL query here",
    "literals": [{{"literal": "literal value"}}],
    "triples_with_literals": [{{"triple": "subject predicate object (with literal)"}}]
}}

<ontology>
{ontology}
</ontology>

Instructions:
- Use the graph name: `<{graph}>` in every SPARQL query.
- Only return the SPARQL query and metadata in the required JSON format.
- Do not explain or comment unless explicitly asked.
- Be accurate in the directionality of triples and respectful of literal types and label usage."#,
            refusal = UNSUPPORTED_LANGUAGE_MESSAGE,
            ontology = ontology.as_str(),
            graph = self.config.graph_name,
        )
    }
}

/// Refusal is checked on the raw content first, so a refusal wrapped in any
/// JSON shape (or none) is recognized, then once more on the parsed query.
fn parse_synthesis(content: &str) -> Result<Synthesis, SynthesisError> {
    if content.contains(UNSUPPORTED_LANGUAGE_MESSAGE) {
        return Ok(Synthesis::Unsupported);
    }

    let cleaned = normalize_json_payload(content);
    let value: Value =
        serde_json::from_str(&cleaned).map_err(|source| SynthesisError::InvalidJson {
            source,
            content: content.to_string(),
        })?;
    let result: SynthesisResult =
        serde_json::from_value(value).map_err(|source| SynthesisError::InvalidStructure {
            source,
            content: content.to_string(),
        })?;

    if result.validate().is_err() {
        return Err(SynthesisError::EmptyQuery);
    }
    if result.sparql_query.trim() == UNSUPPORTED_LANGUAGE_MESSAGE {
        return Ok(Synthesis::Unsupported);
    }

    Ok(Synthesis::Query(result))
}

/// Strip markdown fences and surrounding prose around a JSON object
fn normalize_json_payload(payload: &str) -> String {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }

    let without_fence = if trimmed.starts_with("```") {
        let mut lines = trimmed.lines();
        let _ = lines.next(); // ``` or ```json
        let mut content = lines.collect::<Vec<_>>().join("\n");
        if content.ends_with("```") {
            content.truncate(content.len().saturating_sub(3));
        }
        content.trim().to_string()
    } else {
        trimmed.to_string()
    };

    if let (Some(start), Some(end)) = (without_fence.find('{'), without_fence.rfind('}')) {
        if start < end {
            return without_fence[start..=end].to_string();
        }
    }

    without_fence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LlmError, Role};

    struct NeverCalled;

    #[async_trait::async_trait]
    impl CompletionModel for NeverCalled {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
            Err(LlmError::EmptyResponse)
        }
    }

    fn synthesizer() -> QuerySynthesizer {
        QuerySynthesizer::new(Arc::new(NeverCalled), SynthesizerConfig::default())
    }

    #[test]
    fn test_request_shape() {
        let ontology = Ontology::new("demo:Movie a owl:Class .");
        let request = synthesizer().build_request("Who directed Inception?", &ontology);

        assert_eq!(request.model, "gpt-4o");
        assert!(request.json_mode);
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.messages[1].content, "Who directed Inception?");

        let prompt = &request.messages[0].content;
        assert!(prompt.contains("<ontology>\ndemo:Movie a owl:Class .\n</ontology>"));
        assert!(prompt.contains("`<kgdocu_movies>`"));
        assert!(prompt.contains(UNSUPPORTED_LANGUAGE_MESSAGE));
        assert!(prompt.contains("\"sparql_query\": \"SPARQL query here\""));
    }

    #[test]
    fn test_graph_name_is_configurable() {
        let config = SynthesizerConfig {
            graph_name: "my_graph".into(),
            ..SynthesizerConfig::default()
        };
        let synthesizer = QuerySynthesizer::new(Arc::new(NeverCalled), config);
        let request = synthesizer.build_request("q", &Ontology::new(""));
        assert!(request.messages[0].content.contains("`<my_graph>`"));
    }

    #[test]
    fn test_parse_query() {
        let content = r#"{"sparql_query": "SELECT ?m FROM <kgdocu_movies> WHERE { ?m a demo:Movie }", "literals": [], "triples_with_literals": []}"#;
        match parse_synthesis(content).unwrap() {
            Synthesis::Query(result) => assert!(result.sparql_query.starts_with("SELECT ?m")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_fenced_query() {
        let content = "```json\n{\"sparql_query\": \"ASK {}\"}\n```";
        assert_eq!(
            parse_synthesis(content).unwrap(),
            Synthesis::Query(SynthesisResult::new("ASK {}"))
        );
    }

    #[test]
    fn test_parse_refusal_forms() {
        assert_eq!(
            parse_synthesis(UNSUPPORTED_LANGUAGE_MESSAGE).unwrap(),
            Synthesis::Unsupported
        );
        let wrapped = format!("{{\"message\": \"{}\"}}", UNSUPPORTED_LANGUAGE_MESSAGE);
        assert_eq!(parse_synthesis(&wrapped).unwrap(), Synthesis::Unsupported);
        let in_field = format!(
            "{{\"sparql_query\": \"{}\", \"literals\": []}}",
            UNSUPPORTED_LANGUAGE_MESSAGE
        );
        assert_eq!(parse_synthesis(&in_field).unwrap(), Synthesis::Unsupported);
    }

    #[test]
    fn test_parse_errors_are_distinct() {
        assert!(matches!(
            parse_synthesis("not json at all"),
            Err(SynthesisError::InvalidJson { .. })
        ));
        assert!(matches!(
            parse_synthesis(r#"{"query": "SELECT 1"}"#),
            Err(SynthesisError::InvalidStructure { .. })
        ));
        assert!(matches!(
            parse_synthesis(r#"{"sparql_query": 42}"#),
            Err(SynthesisError::InvalidStructure { .. })
        ));
        assert!(matches!(
            parse_synthesis(r#"{"sparql_query": "  "}"#),
            Err(SynthesisError::EmptyQuery)
        ));
    }

    #[tokio::test]
    async fn test_completion_failure_propagates() {
        let err = synthesizer()
            .synthesize("Who directed Inception?", &Ontology::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::Completion(LlmError::EmptyResponse)));
    }
}
