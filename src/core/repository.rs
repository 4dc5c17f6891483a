pub mod ddb_repository;
pub mod memory_repository;

use async_trait::async_trait;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::gateway::GatewayPublisherVia;

// Predicates are maps of `field` or `field:op` to the value compared against, supported ops are
// `=`, `<>`, `<`, `<=`, `>`, `>=` and `begins_with`.
#[async_trait]
pub trait Repository<Entity>: Sync + Send {
    // create an entity
    async fn create(&self, entity: &Entity) -> LibraryResult<usize>;

    // updates an entity if its stored version still matches
    async fn update(&self, entity: &Entity) -> LibraryResult<usize>;

    // get an entity
    async fn get(&self, id: &str) -> LibraryResult<Entity>;

    // query by predicate, page is 1-based
    async fn query(&self, predicate: &HashMap::<String, String>,
                   page: usize, page_size: usize) -> LibraryResult<PaginatedResult<Entity>>;

    // all records matching predicate
    async fn query_all(&self, predicate: &HashMap::<String, String>) -> LibraryResult<Vec<Entity>> {
        let res = self.query(predicate, 1, usize::MAX).await?;
        Ok(res.records)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub(crate) enum PredicateOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    BeginsWith,
}

impl PredicateOp {
    pub fn parse(op: &str) -> PredicateOp {
        match op {
            "<>" => PredicateOp::Ne,
            "<" => PredicateOp::Lt,
            "<=" => PredicateOp::Le,
            ">" => PredicateOp::Gt,
            ">=" => PredicateOp::Ge,
            "begins_with" => PredicateOp::BeginsWith,
            _ => PredicateOp::Eq,
        }
    }
}

// split_predicate_key separates `due_date:<=` into field name and operator
pub(crate) fn split_predicate_key(key: &str) -> (&str, PredicateOp) {
    match key.split_once(':') {
        Some((field, op)) => (field, PredicateOp::parse(op)),
        None => (key, PredicateOp::Eq),
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub(crate) enum RepositoryStore {
    DynamoDB,
    LocalDynamoDB,
    InMemory,
}

impl RepositoryStore {
    pub fn gateway_publisher(&self) -> GatewayPublisherVia {
        match self {
            RepositoryStore::DynamoDB => { GatewayPublisherVia::Sns }
            RepositoryStore::LocalDynamoDB => { GatewayPublisherVia::LocalDynamoDB }
            RepositoryStore::InMemory => { GatewayPublisherVia::Logs }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::repository::{PredicateOp, RepositoryStore, split_predicate_key};
    use crate::gateway::GatewayPublisherVia;

    #[tokio::test]
    async fn test_should_split_predicate_key() {
        assert_eq!(("item_id", PredicateOp::Eq), split_predicate_key("item_id"));
        assert_eq!(("due_date", PredicateOp::Le), split_predicate_key("due_date:<="));
        assert_eq!(("request_status", PredicateOp::BeginsWith), split_predicate_key("request_status:begins_with"));
        assert_eq!(("loan_status", PredicateOp::Ne), split_predicate_key("loan_status:<>"));
    }

    #[tokio::test]
    async fn test_should_select_publisher() {
        assert_eq!(GatewayPublisherVia::Sns, RepositoryStore::DynamoDB.gateway_publisher());
        assert_eq!(GatewayPublisherVia::LocalDynamoDB, RepositoryStore::LocalDynamoDB.gateway_publisher());
        assert_eq!(GatewayPublisherVia::Logs, RepositoryStore::InMemory.gateway_publisher());
    }
}
