use std::collections::HashSet;
use async_trait::async_trait;
use tracing::info;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;

// LogPublisher writes domain events to the tracing log, it backs the in-memory store
#[derive(Debug, Default)]
pub struct LogPublisher {
    topics: HashSet<String>,
}

impl LogPublisher {
    pub(crate) fn new() -> Self {
        LogPublisher::default()
    }
}

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn create_topic(&mut self, topic: &str) -> Result<String, LibraryError> {
        self.topics.insert(topic.to_string());
        Ok(topic.to_string())
    }

    async fn get_topics(&mut self) -> Result<Vec<String>, LibraryError> {
        let mut topics: Vec<String> = self.topics.iter().cloned().collect();
        topics.sort();
        Ok(topics)
    }

    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        let json = serde_json::to_string(event)?;
        info!(event = event.name.as_str(), key = event.key.as_str(), "domain event {}", json);
        Ok(())
    }
}
