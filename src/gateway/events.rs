use async_trait::async_trait;
use tracing::warn;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;

#[async_trait]
pub(crate) trait EventPublisher: Sync + Send {
    async fn create_topic(&mut self, topic: &str) -> Result<String, LibraryError>;
    async fn get_topics(&mut self) -> Result<Vec<String>, LibraryError>;
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError>;

    // publishes events of a committed transaction, failures are logged and never undo the commit
    async fn publish_all(&self, events: &[DomainEvent]) -> usize {
        let mut published = 0;
        for event in events {
            match self.publish(event).await {
                Ok(_) => published += 1,
                Err(err) => warn!("failed to publish {} for {}: {}", event.name, event.key, err),
            }
        }
        published
    }
}
