use std::collections::HashMap;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::library::{RequestStatus, RequestType};
use crate::requests::domain::model::RequestEntity;
use crate::utils::date::{opt_serializer, serializer};

// RequestDto is a patron's request as returned to callers, position is 0 once closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RequestDto {
    pub request_id: String,
    pub version: i64,
    pub item_id: String,
    #[serde(rename = "user_id")]
    pub patron_id: String,
    pub item_barcode: String,
    #[serde(rename = "user_barcode")]
    pub patron_barcode: String,
    pub request_type: RequestType,
    pub status: RequestStatus,
    #[serde(with = "serializer")]
    pub request_date: NaiveDateTime,
    #[serde(with = "opt_serializer", default)]
    pub expiration_date: Option<NaiveDateTime>,
    #[serde(with = "opt_serializer", default)]
    pub hold_shelf_expiration_date: Option<NaiveDateTime>,
    pub position: i64,
    pub pickup_service_point_id: String,
}

impl From<&RequestEntity> for RequestDto {
    fn from(other: &RequestEntity) -> Self {
        Self {
            request_id: other.request_id.to_string(),
            version: other.version,
            item_id: other.item_id.to_string(),
            patron_id: other.patron_id.to_string(),
            item_barcode: other.item_barcode.to_string(),
            patron_barcode: other.patron_barcode.to_string(),
            request_type: other.request_type,
            status: other.request_status,
            request_date: other.request_date,
            expiration_date: other.expiration_date,
            hold_shelf_expiration_date: other.hold_shelf_expiration_date,
            position: other.queue_position,
            pickup_service_point_id: other.pickup_service_point_id.to_string(),
        }
    }
}

// RequestFilter narrows request listings
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RequestFilter {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
}

impl RequestFilter {
    pub fn to_predicate(&self) -> HashMap<String, String> {
        let mut predicate = HashMap::new();
        if let Some(item_id) = &self.item_id {
            predicate.insert("item_id".to_string(), item_id.to_string());
        }
        if let Some(user_id) = &self.user_id {
            predicate.insert("patron_id".to_string(), user_id.to_string());
        }
        if let Some(status) = self.status {
            predicate.insert("request_status".to_string(), status.to_string());
        }
        predicate
    }
}

#[cfg(test)]
mod tests {
    use crate::core::library::{RequestStatus, RequestType};
    use crate::requests::domain::model::RequestEntity;
    use crate::requests::dto::{RequestDto, RequestFilter};

    #[tokio::test]
    async fn test_should_build_request_predicate() {
        let filter = RequestFilter { status: Some(RequestStatus::OpenAwaitingPickup), user_id: None, item_id: Some("i1".to_string()) };
        let predicate = filter.to_predicate();
        assert_eq!(Some(&"open_awaiting_pickup".to_string()), predicate.get("request_status"));
        assert_eq!(Some(&"i1".to_string()), predicate.get("item_id"));
        assert!(!predicate.contains_key("patron_id"));
    }

    #[tokio::test]
    async fn test_should_serialize_user_fields() {
        let entity = RequestEntity::new("i1", "IT-1", "p1", "PT-1", RequestType::Page, "sp1", None, chrono::Utc::now().naive_utc());
        let json = serde_json::to_value(RequestDto::from(&entity)).expect("should serialize");
        assert_eq!("p1", json["user_id"]);
        assert_eq!("PT-1", json["user_barcode"]);
        assert_eq!("open_not_yet_filled", json["status"]);
        assert_eq!("page", json["request_type"]);
    }
}
