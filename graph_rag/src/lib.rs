//! Knowledge-graph access for the symptom pipeline.
//!
//! `graph_db` holds the Neo4j client, the Cypher builder for the
//! symptom → disease → medicine traversal and the schema cache;
//! `services::GraphService` ties them together for the orchestrator.

pub mod errors;
pub mod graph_db;
pub mod services;

pub use errors::{GraphError, GraphResult};
pub use graph_db::{
    build_treatment_query, validate_symptoms, CypherParam, CypherQuery, GraphStore, Neo4jClient,
    SchemaCache,
};
pub use services::GraphService;
