use std::collections::HashMap;
use std::sync::Mutex;
use aws_sdk_sns::Client;
use async_trait::async_trait;
use aws_sdk_sns::error::SdkError;
use aws_sdk_sns::operation::create_topic::CreateTopicError;
use aws_sdk_sns::operation::list_topics::ListTopicsError;
use aws_sdk_sns::operation::publish::PublishError;
use aws_sdk_sns::types::MessageAttributeValue;
use tracing::info;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;

const TOPIC_PREFIX: &str = "circulation";

// SnsPublisher publishes each event to the topic of its group (loans, requests, fees) so that
// notification delivery subscribes per ledger and filters on the `event` attribute. Topics are
// created on first use and their ARNs cached.
#[derive(Debug)]
pub struct SnsPublisher {
    client: Client,
    topics: Mutex<HashMap<String, String>>,
}

impl SnsPublisher {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            topics: Mutex::new(HashMap::new()),
        }
    }

    fn cached_arn(&self, topic: &str) -> Option<String> {
        self.topics.lock().ok().and_then(|topics| topics.get(topic).cloned())
    }

    pub(crate) fn topic_name(group: &str) -> String {
        format!("{}-{}", TOPIC_PREFIX, group)
    }

    async fn topic_arn(&self, topic: &str) -> Result<String, LibraryError> {
        if let Some(arn) = self.cached_arn(topic) {
            return Ok(arn);
        }
        // create_topic is idempotent and returns the ARN of an existing topic
        let resp = self.client.create_topic().name(topic).send().await?;
        let arn = resp.topic_arn().unwrap_or_default().to_string();
        if let Ok(mut topics) = self.topics.lock() {
            topics.insert(topic.to_string(), arn.to_string());
        }
        info!("created topic {} with arn {}", topic, arn);
        Ok(arn)
    }
}

#[async_trait]
impl EventPublisher for SnsPublisher {
    async fn create_topic(&mut self, topic: &str) -> Result<String, LibraryError> {
        self.topic_arn(topic).await
    }

    async fn get_topics(&mut self) -> Result<Vec<String>, LibraryError> {
        let mut topics = vec![];
        let resp = self.client.list_topics().send().await?;
        for topic in resp.topics().unwrap_or_default() {
            topics.push(topic.topic_arn().unwrap_or_default().to_string());
        }
        Ok(topics)
    }

    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        let arn = self.topic_arn(Self::topic_name(event.group.as_str()).as_str()).await?;
        let json = serde_json::to_string(event)?;
        let mut req = self.client.publish().topic_arn(arn).message(json)
            .message_attributes("event", string_attribute(event.name.as_str()));
        if let Some(branch_id) = event.branch_id() {
            req = req.message_attributes("branch_id", string_attribute(branch_id));
        }
        req.send().await?;
        Ok(())
    }
}

fn string_attribute(value: &str) -> MessageAttributeValue {
    MessageAttributeValue::builder().data_type("String").string_value(value).build()
}

impl From<SdkError<CreateTopicError>> for LibraryError {
    fn from(err: SdkError<CreateTopicError>) -> Self {
        LibraryError::runtime(format!("{:?}", err).as_str(), None)
    }
}

impl From<SdkError<ListTopicsError>> for LibraryError {
    fn from(err: SdkError<ListTopicsError>) -> Self {
        LibraryError::runtime(format!("{:?}", err).as_str(), None)
    }
}

impl From<SdkError<PublishError>> for LibraryError {
    fn from(err: SdkError<PublishError>) -> Self {
        LibraryError::runtime(format!("{:?}", err).as_str(), None)
    }
}
