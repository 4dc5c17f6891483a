use std::collections::HashMap;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::utils::date::{serializer};

// DomainEventType defines type of event for domain changes, circulation records are never deleted
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum DomainEventType {
    Added,
    Updated,
    Closed,
}

// DomainEvent abstracts domain event for data changes
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct DomainEvent {
    pub event_id: String,
    pub name: String,
    pub group: String,
    pub key: String,
    pub kind: DomainEventType,
    pub metadata: HashMap<String, String>,
    pub json_data: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
}

impl DomainEvent {
    pub fn added<T: Serialize>(name: &str, group: &str, key: &str, metadata: &HashMap<String, String>, data: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_string(&data)?;
        Ok(Self::build(name, group, key, DomainEventType::Added, metadata, json))
    }

    pub fn updated<T: Serialize>(name: &str, group: &str, key: &str, metadata: &HashMap<String, String>, data: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_string(&data)?;
        Ok(Self::build(name, group, key, DomainEventType::Updated, metadata, json))
    }

    pub fn closed<T: Serialize>(name: &str, group: &str, key: &str, metadata: &HashMap<String, String>, data: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_string(&data)?;
        Ok(Self::build(name, group, key, DomainEventType::Closed, metadata, json))
    }

    // branch the event was raised at, every circulation service stamps it into the metadata
    pub fn branch_id(&self) -> Option<&str> {
        self.metadata.get("branch_id").map(|b| b.as_str())
    }

    fn build(name: &str, group: &str, key: &str, kind: DomainEventType, metadata: &HashMap<String, String>, json: String) -> DomainEvent {
        DomainEvent {
            event_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            group: group.to_string(),
            key: key.to_string(),
            kind,
            metadata: metadata.clone(),
            json_data: json,
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::events::{DomainEvent, DomainEventType};

    #[tokio::test]
    async fn test_should_build_added() {
        let data = HashMap::from([("a", 1), ("b", 2)]);
        let event = DomainEvent::added("loan_checked_out", "circulation", "key", &HashMap::from([("k".to_string(), "v".to_string())]), &data).expect("build event");
        assert_eq!("loan_checked_out", event.name.as_str());
        assert_eq!("key", event.key.as_str());
        assert_eq!(DomainEventType::Added, event.kind);
    }

    #[tokio::test]
    async fn test_should_build_updated() {
        let data = HashMap::from([("a", 1), ("b", 2)]);
        let event = DomainEvent::updated("loan_renewed", "circulation", "key", &HashMap::new(), &data).expect("build event");
        assert_eq!(DomainEventType::Updated, event.kind);
        assert!(event.json_data.contains("\"a\":1"));
    }

    #[tokio::test]
    async fn test_should_build_closed() {
        let data = HashMap::from([("a", 1), ("b", 2)]);
        let event = DomainEvent::closed("loan_checked_in", "circulation", "key", &HashMap::new(), &data).expect("build event");
        assert_eq!(DomainEventType::Closed, event.kind);
    }

    #[tokio::test]
    async fn test_should_read_branch_from_metadata() {
        let metadata = HashMap::from([("branch_id".to_string(), "main".to_string())]);
        let event = DomainEvent::added("request_created", "requests", "key", &metadata, &"data").expect("build event");
        assert_eq!(Some("main"), event.branch_id());
        let event = DomainEvent::added("request_created", "requests", "key", &HashMap::new(), &"data").expect("build event");
        assert_eq!(None, event.branch_id());
    }

    #[tokio::test]
    async fn test_should_round_trip_event_json() {
        let event = DomainEvent::added("fee_created", "fees", "key", &HashMap::new(), &"data").expect("build event");
        let json = serde_json::to_string(&event).expect("serialize");
        let parsed: DomainEvent = serde_json::from_str(json.as_str()).expect("deserialize");
        assert_eq!(event, parsed);
    }
}
