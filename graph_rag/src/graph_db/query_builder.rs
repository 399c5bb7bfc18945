use medisense_models::{normalize_symptom, SchemaSnapshot};
use neo4rs::{query, BoltType, Query};

/// Node label every symptom term maps to
pub const SYMPTOM_LABEL: &str = "Symptom";

const TREATMENT_CYPHER: &str = "MATCH (s:Symptom)<-[:HAS_SYMPTOM]-(d:Disease)-[:TREATED_BY]->(m:Medicine) \
     WHERE toLower(s.name) IN $symptoms \
     RETURN d.name AS disease, m.name AS medicine";

#[derive(Debug, Clone, PartialEq)]
pub enum CypherParam {
    List(Vec<String>),
}

impl From<CypherParam> for BoltType {
    fn from(param: CypherParam) -> Self {
        match param {
            CypherParam::List(items) => items.into(),
        }
    }
}

/// A Cypher statement with its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CypherQuery {
    pub text: String,
    pub params: Vec<(String, CypherParam)>,
}

impl CypherQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: CypherParam) -> Self {
        self.params.push((key.into(), value));
        self
    }

    pub fn get_param(&self, key: &str) -> Option<&CypherParam> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Symptom list bound to `$symptoms`, empty if unbound
    pub fn symptoms(&self) -> &[String] {
        match self.get_param("symptoms") {
            Some(CypherParam::List(items)) => items,
            _ => &[],
        }
    }

    pub fn to_neo4j(&self) -> Query {
        self.params
            .iter()
            .fold(query(&self.text), |q, (key, value)| q.param(key, value.clone()))
    }
}

/// Keep the symptoms the graph can answer for.
///
/// Without a snapshot every symptom passes. With one, symptoms are kept only
/// if the graph has a `Symptom` label at all. Output is normalized and
/// deduplicated in input order.
pub fn validate_symptoms(symptoms: &[String], schema: Option<&SchemaSnapshot>) -> Vec<String> {
    if let Some(schema) = schema {
        if !schema.has_label(SYMPTOM_LABEL) {
            tracing::debug!("Schema has no {} label; dropping all symptoms", SYMPTOM_LABEL);
            return Vec::new();
        }
    }

    let mut validated: Vec<String> = Vec::with_capacity(symptoms.len());
    for symptom in symptoms.iter().map(|s| normalize_symptom(s)) {
        if !symptom.is_empty() && !validated.contains(&symptom) {
            validated.push(symptom);
        }
    }
    validated
}

/// Build the disease/medicine traversal for the given symptoms.
///
/// An empty validated set still produces a well-formed query that matches
/// nothing.
pub fn build_treatment_query(symptoms: &[String], schema: Option<&SchemaSnapshot>) -> CypherQuery {
    let validated = validate_symptoms(symptoms, schema);
    tracing::debug!(symptoms = ?validated, "Built treatment query");

    CypherQuery::new(TREATMENT_CYPHER).param("symptoms", CypherParam::List(validated))
}
