//! The ontology context used to ground query synthesis

use serde::{Deserialize, Serialize};
use std::fmt;

/// Schema description (classes, properties, labels) of the target graph.
///
/// Loaded once at startup and shared read-only by every request. When the
/// load fails the store's error message is kept as the text and the ontology
/// is marked `degraded`; synthesis still runs against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ontology {
    text: String,
    degraded: bool,
}

impl Ontology {
    /// Ontology loaded successfully from the store
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            degraded: false,
        }
    }

    /// Ontology standing in for a failed load
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            text: message.into(),
            degraded: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Ontology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
