use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::items::domain::model::ItemEntity;
use crate::utils::date::serializer;

// ItemDto is a data transfer object for items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ItemDto {
    pub item_id: String,
    pub version: i64,
    pub barcode: String,
    pub title: String,
    pub location_id: String,
    #[serde(default)]
    pub open_loan_id: Option<String>,
    #[serde(default)]
    pub request_ids: Vec<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl ItemDto {
    pub fn new(barcode: &str, title: &str, location_id: &str) -> Self {
        Self {
            item_id: Uuid::new_v4().to_string(),
            version: 0,
            barcode: barcode.to_string(),
            title: title.to_string(),
            location_id: location_id.to_string(),
            open_loan_id: None,
            request_ids: vec![],
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl From<&ItemEntity> for ItemDto {
    fn from(other: &ItemEntity) -> Self {
        Self {
            item_id: other.item_id.to_string(),
            version: other.version,
            barcode: other.barcode.to_string(),
            title: other.title.to_string(),
            location_id: other.location_id.to_string(),
            open_loan_id: other.open_loan_id.clone(),
            request_ids: other.request_ids.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&ItemDto> for ItemEntity {
    fn from(other: &ItemDto) -> Self {
        Self {
            item_id: other.item_id.to_string(),
            version: other.version,
            barcode: other.barcode.to_string(),
            title: other.title.to_string(),
            location_id: other.location_id.to_string(),
            open_loan_id: other.open_loan_id.clone(),
            request_ids: other.request_ids.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
