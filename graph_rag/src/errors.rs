use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Neo4j error: {0}")]
    Neo4j(String),

    #[error("Failed to decode row: {0}")]
    Decode(String),

    #[error("Neo4j {0} timed out")]
    Timeout(&'static str),

    #[error("Neo4j connection is closed")]
    Closed,
}

impl From<neo4rs::Error> for GraphError {
    fn from(e: neo4rs::Error) -> Self {
        GraphError::Neo4j(e.to_string())
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
