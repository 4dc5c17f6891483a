use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use serde::Serialize;
use crate::core::events::{DomainEvent, DomainEventType};
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;
use crate::utils::date::format_date;
use crate::utils::ddb::parse_item;

// EventRecord is the row kept per event; the events index is keyed by group and creation
// time so one ledger's history reads back in order
#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    event_id: &'a str,
    group: &'a str,
    name: &'a str,
    key: &'a str,
    kind: DomainEventType,
    branch_id: Option<&'a str>,
    data: &'a str,
    created_at: String,
}

impl<'a> From<&'a DomainEvent> for EventRecord<'a> {
    fn from(event: &'a DomainEvent) -> Self {
        EventRecord {
            event_id: event.event_id.as_str(),
            group: event.group.as_str(),
            name: event.name.as_str(),
            key: event.key.as_str(),
            kind: event.kind,
            branch_id: event.branch_id(),
            data: event.json_data.as_str(),
            created_at: format_date(event.created_at),
        }
    }
}

// DDBPublisher appends events to an events table, used with dynamodb local where sns is absent
#[derive(Debug)]
pub struct DDBPublisher {
    client: Client,
    table_name: String,
}

impl DDBPublisher {
    pub(crate) fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }
}

#[async_trait]
impl EventPublisher for DDBPublisher {
    // every group shares the one events table
    async fn create_topic(&mut self, _topic: &str) -> Result<String, LibraryError> {
        Ok(self.table_name.to_string())
    }

    async fn get_topics(&mut self) -> Result<Vec<String>, LibraryError> {
        Ok(vec![self.table_name.to_string()])
    }

    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        let val = serde_json::to_value(EventRecord::from(event))?;
        self.client
            .put_item()
            .table_name(self.table_name.as_str())
            .condition_expression("attribute_not_exists(event_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| ()).map_err(LibraryError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use lazy_static::lazy_static;
    use crate::core::events::DomainEvent;
    use crate::core::repository::RepositoryStore;
    use crate::gateway::ddb::publisher::{DDBPublisher, EventRecord};
    use crate::gateway::events::EventPublisher;
    use crate::gateway::factory::{EVENTS_INDEX_PK, EVENTS_INDEX_SK, EVENTS_KEY, EVENTS_TABLE};
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await.expect("local client");
                let _ = delete_table(&client, EVENTS_TABLE).await;
                let _ = create_table(&client, EVENTS_TABLE, EVENTS_KEY, EVENTS_INDEX_PK, EVENTS_INDEX_SK).await;
                client
            });
    }

    #[tokio::test]
    async fn test_should_flatten_event_record() {
        let metadata = HashMap::from([("branch_id".to_string(), "main".to_string())]);
        let event = DomainEvent::closed("loan_checked_in", "loans", "loan1", &metadata, &"data").expect("build event");
        let json = serde_json::to_value(EventRecord::from(&event)).expect("serialize");
        assert_eq!("loans", json["group"]);
        assert_eq!("main", json["branch_id"]);
        assert_eq!("Closed", json["kind"]);
        assert_eq!(event.json_data.as_str(), json["data"]);
    }

    #[tokio::test]
    #[ignore = "requires dynamodb local"]
    async fn test_should_publish_to_ddb() {
        let data = HashMap::from([("a", 1), ("b", 2)]);
        let event = DomainEvent::added("fee_created", "fees", "key", &HashMap::from([("k".to_string(), "v".to_string())]), &data).expect("build event");
        let mut publisher = DDBPublisher::new(CLIENT.get().await.clone(), EVENTS_TABLE);
        let _ = publisher.create_topic(event.group.as_str()).await.expect("should create topic");
        publisher.publish(&event).await.expect("should publish");
        assert_eq!(vec![EVENTS_TABLE.to_string()], publisher.get_topics().await.expect("should get topics"));
    }
}
