//! Core domain types for kgqa
//!
//! This crate defines the data that flows through the question-answering
//! pipeline: the ontology context, the synthesized query and its metadata,
//! and the normalized tabular result.

pub mod error;
pub mod ontology;
pub mod sparql;
pub mod synthesis;
pub mod table;

pub use error::{CoreError, Result};
pub use ontology::Ontology;
pub use synthesis::{Literal, SynthesisResult, TripleWithLiteral};
pub use table::{normalize, TabularResult};
