//! Structured output of query synthesis

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// A literal value the model referenced while writing the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LiteralRepr")]
pub struct Literal {
    pub literal: String,
}

/// A triple pattern that contains a literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TripleRepr")]
pub struct TripleWithLiteral {
    pub triple: String,
}

// Models emit either `{"literal": "x"}` or a bare `"x"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LiteralRepr {
    Tagged {
        #[serde(alias = "value")]
        literal: String,
    },
    Bare(String),
}

impl From<LiteralRepr> for Literal {
    fn from(repr: LiteralRepr) -> Self {
        match repr {
            LiteralRepr::Tagged { literal } | LiteralRepr::Bare(literal) => Self { literal },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TripleRepr {
    Tagged { triple: String },
    Bare(String),
}

impl From<TripleRepr> for TripleWithLiteral {
    fn from(repr: TripleRepr) -> Self {
        match repr {
            TripleRepr::Tagged { triple } | TripleRepr::Bare(triple) => Self { triple },
        }
    }
}

/// The query produced for one question, plus advisory metadata.
///
/// Only `sparql_query` is checked; `literals` and `triples_with_literals`
/// are passed through as the model returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub sparql_query: String,

    #[serde(default)]
    pub literals: Vec<Literal>,

    #[serde(default)]
    pub triples_with_literals: Vec<TripleWithLiteral>,
}

impl SynthesisResult {
    pub fn new(sparql_query: impl Into<String>) -> Self {
        Self {
            sparql_query: sparql_query.into(),
            literals: Vec::new(),
            triples_with_literals: Vec::new(),
        }
    }

    /// Builder pattern: set literals
    pub fn with_literals(mut self, literals: Vec<Literal>) -> Self {
        self.literals = literals;
        self
    }

    /// Builder pattern: set triples with literals
    pub fn with_triples(mut self, triples: Vec<TripleWithLiteral>) -> Self {
        self.triples_with_literals = triples;
        self
    }

    /// The query must be present and non-blank for the pipeline to proceed
    pub fn validate(&self) -> Result<()> {
        if self.sparql_query.trim().is_empty() {
            return Err(CoreError::Validation(
                "sparql_query is empty".to_string(),
            ));
        }
        Ok(())
    }
}
