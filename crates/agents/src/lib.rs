//! Question answering agents for kgqa
//!
//! This crate contains the translation pipeline:
//! - Llm: chat-completion clients for the language model
//! - Synthesizer: turns a question into SPARQL grounded in the ontology
//! - Ontology: loads the ontology context once at startup
//! - Orchestrator: runs synthesis, execution and normalization per question

pub mod error;
pub mod llm;
pub mod ontology;
pub mod orchestrator;
pub mod synthesizer;

pub use error::{AgentError, LlmError, Result, SynthesisError};
pub use llm::{ChatClient, ChatMessage, CompletionModel, CompletionRequest, Role};
pub use ontology::OntologyLoader;
pub use orchestrator::{PipelineStage, QueryAgent, QueryResponse, ResponseStatus};
pub use synthesizer::{QuerySynthesizer, Synthesis, SynthesizerConfig, UNSUPPORTED_LANGUAGE_MESSAGE};
