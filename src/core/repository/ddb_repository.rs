use std::collections::HashMap;
use std::marker::PhantomData;
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult, ReasonCode};
use crate::core::repository::Repository;
use crate::core::transaction::{TableWrite, WriteCondition};
use crate::utils::ddb::{build_expression, item_to_value, parse_item};

// DDBRepository stores serialized entities in a table keyed by `key_name` with a single GSI
// on (`index_pk`, `index_sk`).
#[derive(Debug)]
pub(crate) struct DDBRepository<E> {
    client: Client,
    table_name: String,
    key_name: String,
    index_name: String,
    index_pk: String,
    index_sk: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E> DDBRepository<E> {
    pub(crate) fn new(client: Client, table_name: &str, key_name: &str,
                      index_name: &str, index_pk: &str, index_sk: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            key_name: key_name.to_string(),
            index_name: index_name.to_string(),
            index_pk: index_pk.to_string(),
            index_sk: index_sk.to_string(),
            _entity: PhantomData,
        }
    }

    async fn put(&self, write: TableWrite) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let mut request = self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(parse_item(write.item)?))
            .expression_attribute_names("#pk", write.key_name.as_str());
        request = match write.condition {
            WriteCondition::NotExists => {
                request.condition_expression("attribute_not_exists(#pk)")
            }
            WriteCondition::VersionEquals(version) => {
                request.condition_expression("attribute_exists(#pk) AND version = :old_version")
                    .expression_attribute_values(":old_version", AttributeValue::N(version.to_string()))
            }
        };
        request.send().await.map(|_| 1).map_err(LibraryError::from)
    }

    // reads every page, queries the index when the predicate pins its partition key. Index reads
    // are eventually consistent, callers that decide under a lock read records by key instead.
    async fn fetch_all(&self, predicate: &HashMap<String, String>) -> LibraryResult<Vec<HashMap<String, AttributeValue>>> {
        let table_name: &str = self.table_name.as_ref();
        let expr = build_expression(predicate, Some(self.index_pk.as_str()), Some(self.index_sk.as_str()));
        let mut items = vec![];
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;
        loop {
            let (page_items, last_key) = if let Some(ref key_condition) = expr.key_condition {
                let out = self.client
                    .query()
                    .table_name(table_name)
                    .index_name(self.index_name.as_str())
                    .key_condition_expression(key_condition)
                    .set_filter_expression(expr.filter.clone())
                    .set_expression_attribute_names(Some(expr.names.clone()))
                    .set_expression_attribute_values(Some(expr.values.clone()))
                    .set_exclusive_start_key(start_key.take())
                    .send()
                    .await?;
                (out.items().unwrap_or_default().to_vec(), out.last_evaluated_key().cloned())
            } else {
                let mut request = self.client
                    .scan()
                    .table_name(table_name)
                    .consistent_read(true)
                    .set_filter_expression(expr.filter.clone())
                    .set_exclusive_start_key(start_key.take());
                if !expr.names.is_empty() {
                    request = request
                        .set_expression_attribute_names(Some(expr.names.clone()))
                        .set_expression_attribute_values(Some(expr.values.clone()));
                }
                let out = request.send().await?;
                (out.items().unwrap_or_default().to_vec(), out.last_evaluated_key().cloned())
            };
            items.extend(page_items);
            match last_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl<E> Repository<E> for DDBRepository<E>
    where E: Identifiable + Serialize + DeserializeOwned + 'static {
    async fn create(&self, entity: &E) -> LibraryResult<usize> {
        self.put(TableWrite::create(self.table_name.as_str(), self.key_name.as_str(), entity)?).await
    }

    async fn update(&self, entity: &E) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        self.put(TableWrite::update(self.table_name.as_str(), self.key_name.as_str(), entity, now)?).await
    }

    async fn get(&self, id: &str) -> LibraryResult<E> {
        let table_name: &str = self.table_name.as_ref();
        let out = self.client
            .get_item()
            .table_name(table_name)
            .consistent_read(true)
            .key(self.key_name.as_str(), AttributeValue::S(id.to_string()))
            .send()
            .await?;
        if let Some(map) = out.item() {
            Ok(serde_json::from_value(item_to_value(map))?)
        } else {
            Err(LibraryError::not_found(
                format!("{} not found for {}", self.key_name, id).as_str(), ReasonCode::RecordNotFound))
        }
    }

    // Note you cannot use certain reserved words per https://docs.aws.amazon.com/amazondynamodb/latest/developerguide/ReservedWords.html
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: usize, page_size: usize) -> LibraryResult<PaginatedResult<E>> {
        let items = self.fetch_all(predicate).await?;
        let total = items.len();
        let skip = page.max(1).saturating_sub(1).saturating_mul(page_size);
        let mut records = vec![];
        for map in items.iter().skip(skip).take(page_size) {
            records.push(serde_json::from_value(item_to_value(map))?);
        }
        Ok(PaginatedResult::new(page.max(1), page_size, total, records))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use lazy_static::lazy_static;
    use serde::{Deserialize, Serialize};
    use crate::core::domain::Identifiable;
    use crate::core::library::LibraryError;
    use crate::core::repository::ddb_repository::DDBRepository;
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        sample_id: String,
        version: i64,
        owner_id: String,
        sample_status: String,
    }

    impl Identifiable for Sample {
        fn id(&self) -> String {
            self.sample_id.to_string()
        }

        fn version(&self) -> i64 {
            self.version
        }
    }

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await.expect("local client");
                let _ = delete_table(&client, "samples").await;
                let _ = create_table(&client, "samples", "sample_id", "owner_id", "sample_status").await;
                client
            });
    }

    fn sample(id: &str, owner: &str) -> Sample {
        Sample { sample_id: id.to_string(), version: 0, owner_id: owner.to_string(), sample_status: "open".to_string() }
    }

    #[tokio::test]
    #[ignore = "requires dynamodb local"]
    async fn test_should_create_get_update_sample() {
        let repo = DDBRepository::<Sample>::new(CLIENT.get().await.clone(), "samples", "sample_id", "samples_ndx", "owner_id", "sample_status");
        let mut entity = sample("ddb-s1", "o1");
        assert_eq!(1, repo.create(&entity).await.expect("should create"));
        assert!(matches!(repo.create(&entity).await, Err(LibraryError::Conflict { .. })));
        entity.sample_status = "closed".to_string();
        assert_eq!(1, repo.update(&entity).await.expect("should update"));
        let loaded = repo.get("ddb-s1").await.expect("should get");
        assert_eq!(1, loaded.version);
        assert_eq!("closed", loaded.sample_status);
        assert!(matches!(repo.update(&entity).await, Err(LibraryError::Conflict { .. })));
    }

    #[tokio::test]
    #[ignore = "requires dynamodb local"]
    async fn test_should_query_samples() {
        let repo = DDBRepository::<Sample>::new(CLIENT.get().await.clone(), "samples", "sample_id", "samples_ndx", "owner_id", "sample_status");
        for i in 0..30 {
            repo.create(&sample(format!("ddb-q{}", i).as_str(), "owner-q")).await.expect("should create");
        }
        let predicate = HashMap::from([
            ("owner_id".to_string(), "owner-q".to_string()),
            ("sample_status:begins_with".to_string(), "op".to_string()),
        ]);
        let res = repo.query(&predicate, 2, 20).await.expect("should query");
        assert_eq!(30, res.total_items);
        assert_eq!(10, res.records.len());
        let all = repo.query_all(&HashMap::from([("sample_status".to_string(), "open".to_string())])).await.expect("should scan");
        assert!(all.len() >= 30);
    }
}
