//! SPARQL constants shared by the loader and the synthesizer

/// Prefix block prepended to fixed queries
pub const PREFIXES: &str = "\
PREFIX xsd:  <http://www.w3.org/2001/XMLSchema#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX owl:  <http://www.w3.org/2002/07/owl#>
PREFIX rdf:  <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX demo: <http://kg.demo.sap.com/>
";

/// Named graph holding the ontology triples
pub const DEFAULT_ONTOLOGY_GRAPH: &str = "wiki_movies_ontology";

/// Named graph every synthesized query must target
pub const DEFAULT_DATA_GRAPH: &str = "kgdocu_movies";

/// CONSTRUCT query returning every triple of the given ontology graph
pub fn ontology_construct_query(graph: &str) -> String {
    format!("{PREFIXES}\nCONSTRUCT\nFROM <{graph}>\nWHERE {{?s ?p ?o}}\n")
}
