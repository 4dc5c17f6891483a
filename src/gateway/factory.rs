use crate::core::library::LibraryResult;
use crate::core::repository::RepositoryStore;
use crate::gateway::ddb::publisher::DDBPublisher;
use crate::gateway::events::EventPublisher;
use crate::gateway::GatewayPublisherVia;
use crate::gateway::logs::publisher::LogPublisher;
use crate::gateway::sns::publisher::SnsPublisher;
use crate::utils::ddb::{build_db_client, build_sns_client, create_table};

pub(crate) const EVENTS_TABLE: &str = "events";
pub(crate) const EVENTS_KEY: &str = "event_id";
pub(crate) const EVENTS_INDEX_PK: &str = "group";
pub(crate) const EVENTS_INDEX_SK: &str = "created_at";

pub(crate) async fn create_publisher(via: GatewayPublisherVia) -> LibraryResult<Box<dyn EventPublisher>> {
    match via {
        GatewayPublisherVia::Sns => {
            let client = build_sns_client().await;
            Ok(Box::new(SnsPublisher::new(client)))
        }
        GatewayPublisherVia::LocalDynamoDB => {
            let client = build_db_client(RepositoryStore::LocalDynamoDB).await?;
            let _ = create_table(&client, EVENTS_TABLE, EVENTS_KEY, EVENTS_INDEX_PK, EVENTS_INDEX_SK).await;
            Ok(Box::new(DDBPublisher::new(client, EVENTS_TABLE)))
        }
        GatewayPublisherVia::Logs => {
            Ok(Box::new(LogPublisher::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::gateway::factory::create_publisher;
    use crate::gateway::GatewayPublisherVia;

    #[tokio::test]
    async fn test_should_create_log_publisher() {
        let mut publisher = create_publisher(GatewayPublisherVia::Logs).await.expect("publisher");
        assert!(publisher.get_topics().await.expect("topics").is_empty());
    }
}
